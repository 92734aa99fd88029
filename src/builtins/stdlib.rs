//! Standard builtins: `len`, `append` and `put`

use std::io::Write;

use crate::builtins::{Builtin, BuiltinRegistry};
use crate::error::{Error, Result};
use crate::runtime::{Object, ObjectType, NULL};

/// Register the standard builtins
pub fn register_all(registry: &mut BuiltinRegistry) {
    registry.register(LenBuiltin);
    registry.register(AppendBuiltin);
    registry.register(PutBuiltin);
}

/// len - character count of a string or element count of an array
pub struct LenBuiltin;

impl Builtin for LenBuiltin {
    fn name(&self) -> &str {
        "len"
    }

    fn execute(&self, args: &[Object]) -> Result<Object> {
        let [value] = args else {
            return Err(Error::WrongArgumentCount {
                got: args.len(),
                want: 1,
            });
        };
        let length = match value {
            Object::String(s) => s.chars().count(),
            Object::Array(elements) => elements.len(),
            other => {
                return Err(Error::UnsupportedArgument {
                    builtin: self.name().to_string(),
                    got: other.object_type(),
                })
            }
        };
        Ok(Object::Integer(length as i64))
    }
}

/// append - new array with one more element at the end
pub struct AppendBuiltin;

impl Builtin for AppendBuiltin {
    fn name(&self) -> &str {
        "append"
    }

    fn execute(&self, args: &[Object]) -> Result<Object> {
        let [target, value] = args else {
            return Err(Error::WrongArgumentCount {
                got: args.len(),
                want: 2,
            });
        };
        let Object::Array(elements) = target else {
            return Err(Error::InvalidFirstArgument {
                builtin: self.name().to_string(),
                expected: ObjectType::Array,
                got: target.object_type(),
            });
        };

        let mut appended = Vec::with_capacity(elements.len() + 1);
        appended.extend(elements.iter().cloned());
        appended.push(value.clone());
        Ok(Object::array(appended))
    }
}

/// put - print arguments separated by spaces, then a newline
pub struct PutBuiltin;

impl Builtin for PutBuiltin {
    fn name(&self) -> &str {
        "put"
    }

    fn execute(&self, args: &[Object]) -> Result<Object> {
        let line = render_line(args);
        let mut stdout = std::io::stdout().lock();
        // Output is best-effort; a closed stdout is not a program error
        if let Err(e) = writeln!(stdout, "{}", line) {
            tracing::debug!(error = %e, "put could not write to stdout");
        }
        Ok(NULL)
    }
}

fn render_line(args: &[Object]) -> String {
    args.iter()
        .map(Object::display)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len() {
        let len = LenBuiltin;
        assert_eq!(
            len.execute(&[Object::string("Hello")]).unwrap(),
            Object::Integer(5)
        );
        assert_eq!(
            len.execute(&[Object::string("héllo")]).unwrap(),
            Object::Integer(5)
        );
        assert_eq!(
            len.execute(&[Object::array(vec![NULL, NULL])]).unwrap(),
            Object::Integer(2)
        );

        let err = len.execute(&[Object::Integer(1)]).unwrap_err();
        assert_eq!(err.to_string(), "argument to len not supported: got INT");
    }

    #[test]
    fn test_len_arity() {
        let err = LenBuiltin
            .execute(&[Object::string("one"), Object::string("two")])
            .unwrap_err();
        assert_eq!(err.to_string(), "wrong number of arguments: got=2, want=1");
    }

    #[test]
    fn test_append_returns_new_array() {
        let source = Object::array(vec![Object::Integer(1)]);
        let appended = AppendBuiltin
            .execute(&[source.clone(), Object::Integer(2)])
            .unwrap();

        assert_eq!(appended, vec![Object::Integer(1), Object::Integer(2)]);
        assert_eq!(source, vec![Object::Integer(1)]);
    }

    #[test]
    fn test_append_requires_array() {
        let err = AppendBuiltin
            .execute(&[Object::Integer(1), Object::Integer(2)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "first argument to `append` must be ARRAY: got=INT"
        );
    }

    #[test]
    fn test_put_renders_display_forms() {
        let line = render_line(&[
            Object::string("a"),
            Object::Integer(1),
            Object::array(vec![Object::Boolean(true)]),
        ]);
        assert_eq!(line, "a 1 [true]");
        assert_eq!(PutBuiltin.execute(&[]).unwrap(), NULL);
    }
}
