use once_cell::sync::Lazy;
use serde::Serialize;

use crate::util::fast_map::{FastHashMap, fast_hash_map_with_capacity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinKind {
    Function,
    Constant,
}

/// A predeclared function or constant of the language.
#[derive(Debug, Clone, Serialize)]
pub struct Builtin {
    pub kind: BuiltinKind,
    pub name: &'static str,
    pub detail: &'static str,
    pub documentation: &'static str,
    /// Declared parameter labels; `None` for constants.
    pub parameters: Option<&'static [&'static str]>,
    pub return_type: &'static str,
}

impl Builtin {
    /// `name(params): ret` for functions, `name: ret` for constants.
    pub fn signature(&self) -> String {
        match self.parameters {
            Some(params) => format!("{}({}): {}", self.name, params.join(", "), self.return_type),
            None => format!("{}: {}", self.name, self.return_type),
        }
    }

    /// Lower bound on the argument count of a call.
    pub fn min_arguments(&self) -> Option<usize> {
        self.parameters.map(<[_]>::len)
    }
}

const X: &[&str] = &["x: number"];
const VARIADIC: &[&str] = &["...args"];

const fn constant(name: &'static str, detail: &'static str, documentation: &'static str, ret: &'static str) -> Builtin {
    Builtin {
        kind: BuiltinKind::Constant,
        name,
        detail,
        documentation,
        parameters: None,
        return_type: ret,
    }
}

const fn unary(name: &'static str, documentation: &'static str) -> Builtin {
    Builtin {
        kind: BuiltinKind::Function,
        name,
        detail: "fn(x: number): number",
        documentation,
        parameters: Some(X),
        return_type: "number",
    }
}

pub static BUILTINS: &[Builtin] = &[
    constant("pi", "constant: number", "π = 3.141592653589793", "number"),
    constant("e", "constant: number", "Euler's number e ≈ 2.718281828", "number"),
    constant("i", "constant: complex", "Imaginary unit i (√-1)", "complex"),
    constant("j", "constant: complex", "Imaginary unit j (alias of i)", "complex"),
    constant("k", "constant: complex", "Imaginary unit k (alias of i)", "complex"),
    unary("sin", "Sine in radians"),
    unary("cos", "Cosine in radians"),
    unary("tan", "Tangent in radians"),
    unary("sec", "Secant in radians (1/cos)"),
    unary("csc", "Cosecant in radians (1/sin)"),
    unary("cot", "Cotangent in radians (cos/sin)"),
    unary("asin", "Arcsine (returns radians)"),
    unary("acos", "Arccosine (returns radians)"),
    unary("atan", "Arctangent (returns radians)"),
    unary("asec", "Arcsecant (returns radians)"),
    unary("acsc", "Arccosecant (returns radians)"),
    unary("acot", "Arccotangent (returns radians)"),
    unary("sinh", "Hyperbolic sine"),
    unary("cosh", "Hyperbolic cosine"),
    unary("tanh", "Hyperbolic tangent"),
    unary("sech", "Hyperbolic secant (1/cosh)"),
    unary("csch", "Hyperbolic cosecant (1/sinh)"),
    unary("coth", "Hyperbolic cotangent (cosh/sinh)"),
    unary("asinh", "Area hyperbolic sine"),
    unary("acosh", "Area hyperbolic cosine"),
    unary("atanh", "Area hyperbolic tangent"),
    unary("asech", "Area hyperbolic secant"),
    unary("acsch", "Area hyperbolic cosecant"),
    unary("acoth", "Area hyperbolic cotangent"),
    unary("ln", "Natural logarithm"),
    unary("log", "Base-10 logarithm"),
    unary("erf", "Error function"),
    unary("erfc", "Complementary error function"),
    Builtin {
        kind: BuiltinKind::Function,
        name: "print",
        detail: "fn(...args): unit",
        documentation: "Print values to standard output",
        parameters: Some(VARIADIC),
        return_type: "unit",
    },
];

/// Statement-level words offered as keyword completions.
pub const KEYWORDS: &[&str] = &["import", "print", "log", "d"];

static BY_NAME: Lazy<FastHashMap<&'static str, &'static Builtin>> = Lazy::new(|| {
    let mut map = fast_hash_map_with_capacity(BUILTINS.len());
    for b in BUILTINS {
        map.insert(b.name, b);
    }
    map
});

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BY_NAME.get(name).copied()
}

/// Built-in with a declared parameter list, used for the arity lower-bound check.
pub fn function(name: &str) -> Option<&'static Builtin> {
    lookup(name).filter(|b| b.kind == BuiltinKind::Function && b.parameters.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_function_and_constant() {
        let sin = lookup("sin").expect("sin is built in");
        assert_eq!(sin.kind, BuiltinKind::Function);
        assert_eq!(sin.signature(), "sin(x: number): number");
        assert_eq!(sin.min_arguments(), Some(1));

        let pi = lookup("pi").expect("pi is built in");
        assert_eq!(pi.signature(), "pi: number");
        assert!(function("pi").is_none());
    }

    #[test]
    fn test_print_is_variadic_with_one_declared_parameter() {
        let print = function("print").expect("print is a function");
        assert_eq!(print.signature(), "print(...args): unit");
        assert_eq!(print.min_arguments(), Some(1));
    }

    #[test]
    fn test_unknown_name() {
        assert!(lookup("frobnicate").is_none());
        assert!(lookup("Sin").is_none());
    }

    #[test]
    fn test_every_builtin_is_a_reserved_word() {
        for b in BUILTINS {
            assert!(crate::token::is_reserved_word(b.name), "{} should lex as keyword", b.name);
        }
    }
}
