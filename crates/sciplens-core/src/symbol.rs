//! SCIP symbol grammar: recovers a readable name and kind from an encoded
//! symbol string.
//!
//! A SCIP symbol is an optional space-separated header
//! (`scheme manager package version`) followed by a descriptor path. Each
//! descriptor is a name plus a suffix that says what it is:
//!
//! | Suffix            | Descriptor     | Kind                     |
//! |-------------------|----------------|--------------------------|
//! | `name/`           | namespace      | Module (Package if alone)|
//! | `name#`           | type           | Class                    |
//! | `name.`           | term           | Variable                 |
//! | `name(disamb).`   | method         | Method / Function        |
//! | `(name)`          | parameter      | Parameter                |
//! | `[name]`          | type parameter | Parameter                |
//! | `name!`           | macro          | Function                 |
//!
//! Names containing delimiters are wrapped in backticks (`` `app.ts`/ ``),
//! with a doubled backtick standing for a literal one.
//!
//! Parsing is total: anything the grammar rejects becomes a
//! [`SymbolKind::Variable`] named after the raw input.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a parsed symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Package,
    Module,
    Class,
    Function,
    Method,
    Parameter,
    Variable,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Package => write!(f, "package"),
            SymbolKind::Module => write!(f, "module"),
            SymbolKind::Class => write!(f, "class"),
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Method => write!(f, "method"),
            SymbolKind::Parameter => write!(f, "parameter"),
            SymbolKind::Variable => write!(f, "variable"),
        }
    }
}

/// Human-readable view of an encoded symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSymbol {
    pub name: String,
    pub kind: SymbolKind,
}

impl ParsedSymbol {
    fn fallback(symbol: &str) -> Self {
        Self {
            name: symbol.to_string(),
            kind: SymbolKind::Variable,
        }
    }
}

/// Parse an encoded SCIP symbol into its name and kind.
///
/// The final descriptor decides the result, in this order:
///
/// 1. method suffix with a type descriptor earlier in the path → Method
/// 2. method (or macro) suffix → Function
/// 3. type suffix → Class
/// 4. parameter or type-parameter wrapper → Parameter
/// 5. the only descriptor, with no header → Package
/// 6. namespace suffix → Module
/// 7. anything else → Variable
pub fn parse(symbol: &str) -> ParsedSymbol {
    let trimmed = symbol.trim();

    if let Some(id) = trimmed.strip_prefix("local ") {
        let id = id.trim();
        if !id.is_empty() {
            return ParsedSymbol {
                name: id.to_string(),
                kind: SymbolKind::Variable,
            };
        }
    }

    let (has_header, path) = split_header(trimmed);
    Scanner::new(path)
        .descriptors()
        .and_then(|descriptors| classify(&descriptors, has_header))
        .unwrap_or_else(|| ParsedSymbol::fallback(symbol))
}

/// Name of the type that owns a method symbol.
///
/// Takes the text after the last backtick, skips to the first `/`, and
/// returns everything up to the next `#`. Returns `None` when any of those
/// delimiters is missing or the owner would be empty.
///
/// ```
/// use sciplens_core::symbol::extract_enclosing_type;
///
/// assert_eq!(extract_enclosing_type("`pkg`/Greeter#greet()."), Some("Greeter"));
/// assert_eq!(extract_enclosing_type("pkg/Mod#method()"), None);
/// ```
pub fn extract_enclosing_type(symbol: &str) -> Option<&str> {
    let (_, after_package) = symbol.rsplit_once('`')?;
    let (_, descriptor) = after_package.split_once('/')?;
    let (owner, _) = descriptor.split_once('#')?;
    (!owner.is_empty()).then_some(owner)
}

/// Split off the `scheme manager package version` header.
///
/// The descriptor path starts after the last space that is not inside a
/// backtick-escaped name.
fn split_header(symbol: &str) -> (bool, &str) {
    let mut in_backticks = false;
    let mut last_space = None;
    for (i, c) in symbol.char_indices() {
        match c {
            '`' => in_backticks = !in_backticks,
            ' ' if !in_backticks => last_space = Some(i),
            _ => {}
        }
    }
    match last_space {
        Some(i) => (true, &symbol[i + 1..]),
        None => (false, symbol),
    }
}

/// One step of a descriptor path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Descriptor {
    Namespace(String),
    Type(String),
    Term(String),
    Method(String),
    Parameter(String),
    TypeParameter(String),
    Macro(String),
    /// A name with no suffix (legal only at the end of the path).
    Bare(String),
}

impl Descriptor {
    fn name(&self) -> &str {
        match self {
            Descriptor::Namespace(n)
            | Descriptor::Type(n)
            | Descriptor::Term(n)
            | Descriptor::Method(n)
            | Descriptor::Parameter(n)
            | Descriptor::TypeParameter(n)
            | Descriptor::Macro(n)
            | Descriptor::Bare(n) => n,
        }
    }
}

fn classify(descriptors: &[Descriptor], has_header: bool) -> Option<ParsedSymbol> {
    let (last, scope) = descriptors.split_last()?;
    let type_scoped = scope.iter().any(|d| matches!(d, Descriptor::Type(_)));

    let kind = match last {
        Descriptor::Method(_) if type_scoped => SymbolKind::Method,
        Descriptor::Method(_) | Descriptor::Macro(_) => SymbolKind::Function,
        Descriptor::Type(_) => SymbolKind::Class,
        Descriptor::Parameter(_) | Descriptor::TypeParameter(_) => SymbolKind::Parameter,
        _ if scope.is_empty() && !has_header => SymbolKind::Package,
        Descriptor::Namespace(_) => SymbolKind::Module,
        _ => SymbolKind::Variable,
    };

    Some(ParsedSymbol {
        name: last.name().to_string(),
        kind,
    })
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '/' | '#' | '.' | '(' | ')' | '[' | ']' | '!' | '`' | ' ')
}

/// Recursive-descent scanner over a descriptor path.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume up to and including `close`, returning the text before it.
    fn until(&mut self, close: char) -> Option<&'a str> {
        let rest = &self.input[self.pos..];
        let end = rest.find(close)?;
        self.pos += end + close.len_utf8();
        Some(&rest[..end])
    }

    /// `path := descriptor*`
    fn descriptors(mut self) -> Option<Vec<Descriptor>> {
        let mut out = Vec::new();
        while self.peek().is_some() {
            out.push(self.descriptor()?);
        }
        Some(out)
    }

    fn descriptor(&mut self) -> Option<Descriptor> {
        if self.eat('(') {
            let name = self.until(')')?;
            return non_empty(name).map(Descriptor::Parameter);
        }
        if self.eat('[') {
            let name = self.until(']')?;
            return non_empty(name).map(Descriptor::TypeParameter);
        }

        let name = self.name()?;
        match self.peek() {
            None => Some(Descriptor::Bare(name)),
            Some('/') => {
                self.pos += 1;
                Some(Descriptor::Namespace(name))
            }
            Some('#') => {
                self.pos += 1;
                Some(Descriptor::Type(name))
            }
            Some('.') => {
                self.pos += 1;
                Some(Descriptor::Term(name))
            }
            Some('!') => {
                self.pos += 1;
                Some(Descriptor::Macro(name))
            }
            Some('(') => {
                self.pos += 1;
                // Overload disambiguator, e.g. `(+1)`.
                self.until(')')?;
                self.eat('.');
                Some(Descriptor::Method(name))
            }
            Some(_) => None,
        }
    }

    fn name(&mut self) -> Option<String> {
        if self.eat('`') {
            let mut name = String::new();
            loop {
                let c = self.next_char()?;
                if c == '`' {
                    if self.eat('`') {
                        name.push('`');
                        continue;
                    }
                    break;
                }
                name.push(c);
            }
            return non_empty(&name);
        }

        let start = self.pos;
        while let Some(c) = self.peek()
            && !is_delimiter(c)
        {
            self.pos += c.len_utf8();
        }
        non_empty(&self.input[start..self.pos])
    }
}

fn non_empty(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
