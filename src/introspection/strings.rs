use super::host::{int_arg, str_arg, HostError, HostResult, ParamType, TypeInfo};
use crate::interpreter::value::Value;

use std::sync::OnceLock;

/// Members callable on string values, e.g. `name.toUpperCase()`.
pub fn string_type() -> &'static TypeInfo {
    static TYPE: OnceLock<TypeInfo> = OnceLock::new();
    TYPE.get_or_init(|| {
        TypeInfo::builder::<String>("String")
            .method("length", &[], |s, _| Ok(Value::Integer(char_len(s))))
            .method("isEmpty", &[], |s, _| Ok(Value::Boolean(s.is_empty())))
            .method("toUpperCase", &[], |s, _| Ok(Value::from(s.to_uppercase())))
            .method("toLowerCase", &[], |s, _| Ok(Value::from(s.to_lowercase())))
            .method("trim", &[], |s, _| Ok(Value::from(s.trim())))
            .method("contains", &[ParamType::String], |s, args| {
                Ok(Value::Boolean(s.contains(required_str(args, 0)?)))
            })
            .method("startsWith", &[ParamType::String], |s, args| {
                Ok(Value::Boolean(s.starts_with(required_str(args, 0)?)))
            })
            .method("endsWith", &[ParamType::String], |s, args| {
                Ok(Value::Boolean(s.ends_with(required_str(args, 0)?)))
            })
            .method("indexOf", &[ParamType::String], |s, args| {
                let needle = required_str(args, 0)?;
                let index = s
                    .find(needle)
                    .map_or(-1, |byte_idx| char_len(&s[..byte_idx]));
                Ok(Value::Integer(index))
            })
            .method("charAt", &[ParamType::Integer], |s, args| {
                let index = int_arg(args, 0)?;
                let ch = usize::try_from(index)
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .ok_or_else(|| out_of_range(index, s))?;
                Ok(Value::from(ch.to_string()))
            })
            .method("substring", &[ParamType::Integer], |s, args| {
                substring(s, int_arg(args, 0)?, char_len(s))
            })
            .method(
                "substring",
                &[ParamType::Integer, ParamType::Integer],
                |s, args| substring(s, int_arg(args, 0)?, int_arg(args, 1)?),
            )
            .method(
                "replace",
                &[ParamType::String, ParamType::String],
                |s, args| {
                    let from = required_str(args, 0)?;
                    let to = required_str(args, 1)?;
                    Ok(Value::from(s.replace(from, to)))
                },
            )
            .method("concat", &[ParamType::String], |s, args| {
                Ok(Value::from(format!("{}{}", s, required_str(args, 0)?)))
            })
            .method("equals", &[ParamType::Any], |s, args| {
                Ok(Value::Boolean(matches!(args.first(), Some(Value::String(o)) if o == s)))
            })
            .build()
    })
}

fn required_str(args: &[Value], idx: usize) -> HostResult<&str> {
    str_arg(args, idx)?.ok_or(HostError::BadArgument(idx))
}

fn char_len(s: &str) -> i64 {
    s.chars().count() as i64
}

fn out_of_range(index: i64, s: &str) -> HostError {
    HostError::Failed(format!(
        "index {} out of range for string of length {}",
        index,
        char_len(s)
    ))
}

/// Character-indexed `[start, end)` slice.
fn substring(s: &str, start: i64, end: i64) -> HostResult<Value> {
    if start < 0 || end < start || end > char_len(s) {
        return Err(out_of_range(if start < 0 { start } else { end }, s));
    }

    let slice: String = s
        .chars()
        .skip(start as usize)
        .take((end - start) as usize)
        .collect();
    Ok(Value::from(slice))
}
