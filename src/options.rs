use crate::introspection::OverloadPolicy;

/// Engine-wide evaluation settings.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Options {
    /// Undefined variables and null arithmetic operands become errors.
    pub strict: bool,
    pub overload_policy: OverloadPolicy,
    /// Keep resolved member handles for reuse across evaluations.
    pub cache_members: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            strict: false,
            overload_policy: OverloadPolicy::default(),
            cache_members: true,
        }
    }
}

impl Options {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn overload_policy(mut self, policy: OverloadPolicy) -> Self {
        self.overload_policy = policy;
        self
    }

    pub fn cache_members(mut self, cache: bool) -> Self {
        self.cache_members = cache;
        self
    }
}
