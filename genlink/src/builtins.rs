// builtins.rs — Specialized operator implementations usable as call targets
//
// Link manifests bind call sites to these by name. Each builtin is created
// once per process and cloned out, so two bindings to the same builtin share
// code.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::binding::{CallTarget, Signature, Value, ValueType};

use ValueType::{Bool, Str, F64, I64};

type Builtin = (&'static str, CallTarget);

fn op(
    name: &'static str,
    signature: Signature,
    entry: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
) -> Builtin {
    (name, CallTarget::new(name, signature, entry))
}

fn i64_binop(name: &'static str, f: fn(i64, i64) -> i64) -> Builtin {
    op(name, Signature::new([I64, I64], I64), move |args| match args {
        [Value::I64(a), Value::I64(b)] => Value::I64(f(*a, *b)),
        _ => Value::Unit,
    })
}

fn f64_binop(name: &'static str, f: fn(f64, f64) -> f64) -> Builtin {
    op(name, Signature::new([F64, F64], F64), move |args| match args {
        [Value::F64(a), Value::F64(b)] => Value::F64(f(*a, *b)),
        _ => Value::Unit,
    })
}

fn table() -> &'static BTreeMap<&'static str, CallTarget> {
    static TABLE: OnceLock<BTreeMap<&'static str, CallTarget>> = OnceLock::new();
    TABLE.get_or_init(|| {
        BTreeMap::from([
            i64_binop("add_i64", i64::wrapping_add),
            i64_binop("sub_i64", i64::wrapping_sub),
            i64_binop("mul_i64", i64::wrapping_mul),
            i64_binop("max_i64", i64::max),
            f64_binop("add_f64", |a, b| a + b),
            f64_binop("mul_f64", |a, b| a * b),
            op("eq_i64", Signature::new([I64, I64], Bool), |args| match args {
                [Value::I64(a), Value::I64(b)] => Value::Bool(a == b),
                _ => Value::Unit,
            }),
            op("not_bool", Signature::new([Bool], Bool), |args| match args {
                [Value::Bool(v)] => Value::Bool(!v),
                _ => Value::Unit,
            }),
            op("concat_str", Signature::new([Str, Str], Str), |args| match args {
                [Value::Str(a), Value::Str(b)] => Value::Str(format!("{a}{b}")),
                _ => Value::Unit,
            }),
            op("len_str", Signature::new([Str], I64), |args| match args {
                [Value::Str(s)] => Value::I64(s.chars().count() as i64),
                _ => Value::Unit,
            }),
        ])
    })
}

/// Look up a builtin operator by name.
pub fn builtin(name: &str) -> Option<CallTarget> {
    table().get(name).cloned()
}

/// Names of all builtins, sorted.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    table().keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_builtins() {
        let add = builtin("add_i64").unwrap();
        assert_eq!(add.invoke(&[Value::I64(40), Value::I64(2)]).unwrap(), Value::I64(42));
        let mul = builtin("mul_f64").unwrap();
        assert_eq!(
            mul.invoke(&[Value::F64(1.5), Value::F64(2.0)]).unwrap(),
            Value::F64(3.0)
        );
    }

    #[test]
    fn string_builtins() {
        let concat = builtin("concat_str").unwrap();
        assert_eq!(
            concat
                .invoke(&[Value::Str("gen".into()), Value::Str("link".into())])
                .unwrap(),
            Value::Str("genlink".into())
        );
        let len = builtin("len_str").unwrap();
        assert_eq!(len.invoke(&[Value::Str("größe".into())]).unwrap(), Value::I64(5));
    }

    #[test]
    fn lookups_share_code() {
        let a = builtin("sub_i64").unwrap();
        let b = builtin("sub_i64").unwrap();
        assert!(CallTarget::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_builtin() {
        assert!(builtin("div_i64").is_none());
    }

    #[test]
    fn names_are_sorted_and_complete() {
        let names: Vec<_> = builtin_names().collect();
        assert_eq!(names.len(), 10);
        assert!(names.windows(2).all(|w| w[0] < w[1]));
        for name in names {
            assert_eq!(builtin(name).unwrap().name(), name);
        }
    }
}
