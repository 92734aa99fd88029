use std::collections::HashMap;
use std::fmt;
use std::hash::Hasher;
use std::rc::Rc;
use std::sync::Arc;

use crate::builtins::Builtin;
use crate::parser::FunctionLiteral;
use crate::runtime::Environment;

/// Runtime type tag, as shown in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
    /// Boolean
    Boolean,
    /// Null
    Null,
    /// Internal return wrapper
    ReturnValue,
    /// Error value
    Error,
    /// User-defined function
    Function,
    /// String
    String,
    /// Native builtin
    Builtin,
    /// Array
    Array,
    /// Hash map
    Hash,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ObjectType::Integer => "INT",
            ObjectType::Float => "FLOAT",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::Null => "NULL",
            ObjectType::ReturnValue => "RETURN_VALUE",
            ObjectType::Error => "ERROR",
            ObjectType::Function => "FUNCTION",
            ObjectType::String => "STRING",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
        };
        f.write_str(name)
    }
}

/// Key of a hash entry: the type tag plus a 64-bit value derived from the key
///
/// Keys of different types never collide, so `1` and `true` are distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    /// Type of the key as written
    pub object_type: ObjectType,
    /// Bit pattern or content hash of the key
    pub value: u64,
}

/// An entry of a hash, keeping the key as written for display
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    /// Key as written
    pub key: Object,
    /// Associated value
    pub value: Object,
}

/// A closure: function literal plus the environment it was defined in
#[derive(Clone)]
pub struct Function {
    /// Parameters and body, shared with the AST
    pub literal: Rc<FunctionLiteral>,
    /// Environment captured at definition time
    pub env: Environment,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // The captured environment may contain this very function.
        f.debug_struct("Function")
            .field("literal", &self.literal.to_string())
            .finish_non_exhaustive()
    }
}

/// Runtime value representation
#[derive(Debug, Clone)]
pub enum Object {
    // Primitives
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating-point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// String value
    String(String),
    /// Null value
    Null,

    // Collections (reference-counted, never mutated after construction)
    /// Array of values
    Array(Rc<Vec<Object>>),
    /// Hash from key to (key, value)
    Hash(Rc<HashMap<HashKey, HashPair>>),

    // Callables
    /// User-defined closure
    Function(Rc<Function>),
    /// Native function from the builtin registry
    Builtin(Arc<dyn Builtin>),

    // Control flow
    /// Value of a `return`, tunnelling up to the enclosing call or program
    ReturnValue(Box<Object>),
    /// Evaluation error
    Error(String),
}

/// Shared `true`
pub const TRUE: Object = Object::Boolean(true);
/// Shared `false`
pub const FALSE: Object = Object::Boolean(false);
/// Shared `null`
pub const NULL: Object = Object::Null;

impl Object {
    /// Creates an array value from a vector of values
    pub fn array(elements: Vec<Object>) -> Self {
        Object::Array(Rc::new(elements))
    }

    /// Creates a hash value from its entries
    pub fn hash(pairs: HashMap<HashKey, HashPair>) -> Self {
        Object::Hash(Rc::new(pairs))
    }

    /// Creates a string value
    pub fn string(value: impl Into<String>) -> Self {
        Object::String(value.into())
    }

    /// Maps a native bool onto the boolean objects
    pub fn from_bool(value: bool) -> Self {
        if value {
            TRUE
        } else {
            FALSE
        }
    }

    /// Returns the runtime type tag
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Float(_) => ObjectType::Float,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Null => ObjectType::Null,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::ReturnValue(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
        }
    }

    /// Only `false` and `null` are falsy; `0`, `""` and `[]` are truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    /// True for error values
    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Derives the hash key, or `None` if this type cannot be a key
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(n) => *n as u64,
            Object::Float(f) => f.to_bits(),
            Object::Boolean(b) => u64::from(*b),
            Object::String(s) => {
                let mut hasher = Fnv1a::default();
                hasher.write(s.as_bytes());
                hasher.finish()
            }
            _ => return None,
        };
        Some(HashKey {
            object_type: self.object_type(),
            value,
        })
    }

    /// Printable form shown by front-ends
    pub fn display(&self) -> String {
        self.to_string()
    }
}

/// 64-bit FNV-1a, used for string hash keys
struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Fnv1a(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for Fnv1a {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{}", n),
            Object::Float(fl) => write!(f, "{}", fl),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::String(s) => f.write_str(s),
            Object::Null => write!(f, "null"),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, val) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            Object::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, pair) in pairs.values().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
            Object::Function(func) => write!(f, "{}", func.literal),
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::ReturnValue(val) => write!(f, "{}", val),
            Object::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Float(a), Object::Float(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            // Callables compare by identity
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name() == b.name(),
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq<Vec<Object>> for Object {
    fn eq(&self, other: &Vec<Object>) -> bool {
        match self {
            Object::Array(elements) => elements.as_ref() == other,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Object::Integer(1).object_type().to_string(), "INT");
        assert_eq!(Object::Float(1.5).object_type().to_string(), "FLOAT");
        assert_eq!(TRUE.object_type().to_string(), "BOOLEAN");
        assert_eq!(NULL.object_type().to_string(), "NULL");
        assert_eq!(Object::string("s").object_type().to_string(), "STRING");
        assert_eq!(Object::array(vec![]).object_type().to_string(), "ARRAY");
    }

    #[test]
    fn test_truthiness() {
        assert!(!NULL.is_truthy());
        assert!(!FALSE.is_truthy());
        assert!(TRUE.is_truthy());
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::string("").is_truthy());
        assert!(Object::array(vec![]).is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(Object::Float(26.0).to_string(), "26");
        assert_eq!(Object::Float(2.5).to_string(), "2.5");
        assert_eq!(Object::string("hi").to_string(), "hi");
        assert_eq!(
            Object::array(vec![Object::Integer(1), Object::string("a"), NULL]).to_string(),
            "[1,a,null]"
        );
        assert_eq!(
            Object::Error("boom".to_string()).display(),
            "ERROR: boom"
        );
    }

    #[test]
    fn test_hash_keys_do_not_alias_across_types() {
        let one = Object::Integer(1).hash_key().unwrap();
        let yes = TRUE.hash_key().unwrap();
        assert_eq!(one.value, yes.value);
        assert_ne!(one, yes);
    }

    #[test]
    fn test_string_hash_keys_follow_content() {
        let a = Object::string("name").hash_key().unwrap();
        let b = Object::string("name").hash_key().unwrap();
        let c = Object::string("other").hash_key().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        // FNV-1a of the empty input is the offset basis
        assert_eq!(
            Object::string("").hash_key().unwrap().value,
            0xcbf2_9ce4_8422_2325
        );
    }

    #[test]
    fn test_unhashable_types() {
        assert!(NULL.hash_key().is_none());
        assert!(Object::array(vec![]).hash_key().is_none());
    }

    #[test]
    fn test_float_keys_use_bit_pattern() {
        let key = Object::Float(7.1).hash_key().unwrap();
        assert_eq!(key.value, 7.1f64.to_bits());
        assert_eq!(key.object_type, ObjectType::Float);
    }
}
