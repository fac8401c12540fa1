// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module-level source scanner.
//!
//! Tokenizes a source text far enough to validate its lexical structure
//! (terminated strings, comments, template literals and regular
//! expressions, balanced brackets) and to extract the static module
//! interface: the specifiers it imports and the names it exports. Function
//! bodies and expressions are not parsed.

use std::fmt;
use thiserror::Error;

/// A syntax error with the line it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {line})")]
pub struct SyntaxError {
    /// What went wrong
    pub message: String,
    /// 1-based line number
    pub line: usize,
}

impl SyntaxError {
    fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// The static import/export interface of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSyntax {
    /// Imported specifiers in source order, without duplicates
    pub imports: Vec<String>,
    /// Exported names in source order (`*` for `export * from`)
    pub exports: Vec<String>,
}

impl ModuleSyntax {
    fn add_import(&mut self, specifier: String) {
        if !self.imports.contains(&specifier) {
            self.imports.push(specifier);
        }
    }

    fn add_export(&mut self, name: String, line: usize) -> Result<(), SyntaxError> {
        if name != "*" && self.exports.contains(&name) {
            return Err(SyntaxError::new(format!("Duplicate export of '{}'", name), line));
        }
        self.exports.push(name);
        Ok(())
    }
}

/// Token kinds the scanner distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword
    Identifier(String),
    /// String literal with quotes removed
    String(String),
    /// Numeric literal
    Number,
    /// Template literal
    Template,
    /// Regular expression literal
    RegExp,
    /// Any other single punctuator character
    Punct(char),
    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "{}", name),
            TokenKind::String(s) => write!(f, "'{}'", s),
            TokenKind::Number => f.write_str("number"),
            TokenKind::Template => f.write_str("template literal"),
            TokenKind::RegExp => f.write_str("regular expression"),
            TokenKind::Punct(c) => write!(f, "{}", c),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

/// A token with its line and bracket nesting depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token kind
    pub kind: TokenKind,
    /// 1-based line number
    pub line: usize,
    /// Number of brackets open before this token
    pub depth: usize,
}

impl Token {
    fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Identifier(n) if n == name)
    }

    fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}

/// Keywords after which a `/` starts a regular expression.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// A scanner that tokenizes source text.
pub struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    regex_allowed: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            line: 1,
            regex_allowed: true,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Result<(TokenKind, usize), SyntaxError> {
        self.skip_whitespace_and_comments()?;

        let line = self.line;
        let Some(ch) = self.advance() else {
            return Ok((TokenKind::Eof, line));
        };

        let mut update = false;
        let kind = match ch {
            '"' | '\'' => self.scan_string(ch)?,
            '`' => self.scan_template()?,
            '/' if self.regex_allowed => self.scan_regex()?,
            '0'..='9' => self.scan_number(),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            _ if is_id_start(ch) => self.scan_identifier(ch),
            '+' | '-' if self.peek() == Some(ch) => {
                // `++` and `--` end an operand when postfix
                self.advance();
                update = true;
                TokenKind::Punct(ch)
            }
            _ => TokenKind::Punct(ch),
        };

        self.regex_allowed = match &kind {
            TokenKind::Punct(_) if update => false,
            TokenKind::Punct(c) => !matches!(c, ')' | ']' | '}'),
            TokenKind::Identifier(name) => REGEX_PREFIX_KEYWORDS.contains(&name.as_str()),
            _ => false,
        };

        Ok((kind, line))
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, ch)| ch)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), SyntaxError> {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_second() == Some('/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else if ch == '/' && self.peek_second() == Some('*') {
                let start = self.line;
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        Some(_) => {}
                        None => return Err(SyntaxError::new("Unterminated comment", start)),
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn scan_string(&mut self, quote: char) -> Result<TokenKind, SyntaxError> {
        let start = self.line;
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(TokenKind::String(value)),
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    // Line continuation
                    Some('\n') => {}
                    Some('\r') => {
                        if self.peek() == Some('\n') {
                            self.advance();
                        }
                    }
                    Some(c) => value.push(c),
                    None => break,
                },
                Some('\n') | None => break,
                Some(c) => value.push(c),
            }
        }

        Err(SyntaxError::new("Unterminated string literal", start))
    }

    fn scan_template(&mut self) -> Result<TokenKind, SyntaxError> {
        let start = self.line;

        loop {
            match self.advance() {
                Some('`') => return Ok(TokenKind::Template),
                Some('\\') => {
                    self.advance();
                }
                Some('$') if self.peek() == Some('{') => {
                    self.advance();
                    self.scan_substitution()?;
                }
                Some(_) => {}
                None => return Err(SyntaxError::new("Unterminated template literal", start)),
            }
        }
    }

    /// Skips the tokens of a `${ ... }` substitution up to its closing brace.
    fn scan_substitution(&mut self) -> Result<(), SyntaxError> {
        let start = self.line;
        let mut depth = 1usize;
        self.regex_allowed = true;

        loop {
            match self.next_token()?.0 {
                TokenKind::Punct('{') => depth += 1,
                TokenKind::Punct('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                TokenKind::Eof => {
                    return Err(SyntaxError::new("Unterminated template literal", start));
                }
                _ => {}
            }
        }
    }

    fn scan_regex(&mut self) -> Result<TokenKind, SyntaxError> {
        let start = self.line;
        let mut in_class = false;

        loop {
            match self.advance() {
                Some('\\') => {
                    if matches!(self.advance(), None | Some('\n')) {
                        break;
                    }
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => {
                    while self.peek().is_some_and(is_id_continue) {
                        self.advance();
                    }
                    return Ok(TokenKind::RegExp);
                }
                Some('\n') | None => break,
                Some(_) => {}
            }
        }

        Err(SyntaxError::new("Invalid regular expression: missing /", start))
    }

    fn scan_number(&mut self) -> TokenKind {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            self.advance();
        }
        TokenKind::Number
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);
        while let Some(c) = self.peek().filter(|&c| is_id_continue(c)) {
            name.push(c);
            self.advance();
        }
        TokenKind::Identifier(name)
    }
}

fn is_id_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_id_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Tokenizes `source`, checking that brackets balance.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    let mut open: Vec<(char, usize)> = Vec::new();

    loop {
        let (kind, line) = scanner.next_token()?;

        match kind {
            TokenKind::Punct(c @ ('(' | '[' | '{')) => {
                tokens.push(Token { kind, line, depth: open.len() });
                open.push((c, line));
            }
            TokenKind::Punct(c @ (')' | ']' | '}')) => {
                match open.pop() {
                    Some((o, _)) if closing(o) == c => {}
                    _ => return Err(SyntaxError::new(format!("Unexpected token '{}'", c), line)),
                }
                tokens.push(Token { kind, line, depth: open.len() });
            }
            TokenKind::Eof => {
                if let Some(&(o, at)) = open.last() {
                    return Err(SyntaxError::new(
                        format!("Unexpected end of input, '{}' opened here is not closed", o),
                        at,
                    ));
                }
                tokens.push(Token { kind, line, depth: 0 });
                return Ok(tokens);
            }
            _ => tokens.push(Token { kind, line, depth: open.len() }),
        }
    }
}

/// Scans a source text and extracts its module interface.
///
/// With `module` unset the text is treated as a classic script, where
/// static `import` and `export` declarations are syntax errors.
pub fn scan_module(source: &str, module: bool) -> Result<ModuleSyntax, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut syntax = ModuleSyntax::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let after_dot = i > 0 && tokens[i - 1].is_punct('.');

        if token.depth != 0 || after_dot {
            i += 1;
            continue;
        }

        if token.is_ident("import") {
            let next = &tokens[i + 1];
            // import(...) and import.meta are expressions
            if next.is_punct('(') || next.is_punct('.') {
                i += 1;
                continue;
            }
            if !module {
                return Err(SyntaxError::new(
                    "Cannot use import statement outside a module",
                    token.line,
                ));
            }
            i = parse_import(&tokens, i + 1, &mut syntax)?;
        } else if token.is_ident("export") {
            if !module {
                return Err(SyntaxError::new("Unexpected token 'export'", token.line));
            }
            i = parse_export(&tokens, i + 1, &mut syntax)?;
        } else {
            i += 1;
        }
    }

    Ok(syntax)
}

/// Parses the clause after `import`. Returns the index after the declaration.
fn parse_import(tokens: &[Token], start: usize, syntax: &mut ModuleSyntax) -> Result<usize, SyntaxError> {
    if let TokenKind::String(specifier) = &tokens[start].kind {
        syntax.add_import(specifier.clone());
        return Ok(start + 1);
    }

    let mut j = start;
    while j < tokens.len() {
        let token = &tokens[j];
        if token.is_ident("from") && token.depth == 0 {
            return expect_from_specifier(tokens, j, syntax);
        }
        if token.kind == TokenKind::Eof || (token.depth == 0 && token.is_punct(';')) {
            break;
        }
        j += 1;
    }

    Err(SyntaxError::new(
        "Expected 'from' after import clause",
        tokens[start].line,
    ))
}

/// Parses `from '<specifier>'` at `from_index`.
fn expect_from_specifier(
    tokens: &[Token],
    from_index: usize,
    syntax: &mut ModuleSyntax,
) -> Result<usize, SyntaxError> {
    let token = &tokens[from_index];
    if !token.is_ident("from") {
        return Err(SyntaxError::new(
            format!("Unexpected token '{}', expected 'from'", token.kind),
            token.line,
        ));
    }

    match &tokens[from_index + 1].kind {
        TokenKind::String(specifier) => {
            syntax.add_import(specifier.clone());
            Ok(from_index + 2)
        }
        other => Err(SyntaxError::new(
            format!("Expected module specifier string, found '{}'", other),
            tokens[from_index + 1].line,
        )),
    }
}

/// Returns the name a binding or export-list entry refers to.
fn binding_name(token: &Token) -> Option<String> {
    match &token.kind {
        TokenKind::Identifier(name) | TokenKind::String(name) => Some(name.clone()),
        _ => None,
    }
}

/// Parses the declaration after `export`. Returns the index to continue at.
fn parse_export(tokens: &[Token], start: usize, syntax: &mut ModuleSyntax) -> Result<usize, SyntaxError> {
    let token = &tokens[start];
    let line = token.line;

    match &token.kind {
        TokenKind::Punct('*') => {
            let mut j = start + 1;
            let mut name = "*".to_string();
            if tokens[j].is_ident("as") {
                name = binding_name(&tokens[j + 1]).ok_or_else(|| {
                    SyntaxError::new("Expected name after 'as'", tokens[j + 1].line)
                })?;
                j += 2;
            }
            let next = expect_from_specifier(tokens, j, syntax)?;
            syntax.add_export(name, line)?;
            Ok(next)
        }
        TokenKind::Punct('{') => {
            let mut names = Vec::new();
            let mut j = start + 1;

            while !tokens[j].is_punct('}') {
                let local = binding_name(&tokens[j]).ok_or_else(|| {
                    SyntaxError::new(
                        format!("Unexpected token '{}' in export list", tokens[j].kind),
                        tokens[j].line,
                    )
                })?;
                j += 1;

                let mut exported = local;
                if tokens[j].is_ident("as") {
                    exported = binding_name(&tokens[j + 1]).ok_or_else(|| {
                        SyntaxError::new("Expected name after 'as'", tokens[j + 1].line)
                    })?;
                    j += 2;
                }
                names.push(exported);

                if tokens[j].is_punct(',') {
                    j += 1;
                } else if !tokens[j].is_punct('}') {
                    return Err(SyntaxError::new(
                        format!("Unexpected token '{}' in export list", tokens[j].kind),
                        tokens[j].line,
                    ));
                }
            }
            j += 1;

            if tokens[j].is_ident("from") {
                j = expect_from_specifier(tokens, j, syntax)?;
            }
            for name in names {
                syntax.add_export(name, line)?;
            }
            Ok(j)
        }
        TokenKind::Identifier(keyword) => match keyword.as_str() {
            "default" => {
                syntax.add_export("default".to_string(), line)?;
                Ok(start + 1)
            }
            "const" | "let" | "var" => parse_declarators(tokens, start + 1, token.depth, syntax),
            "async" | "function" | "class" => {
                let mut j = start;
                if keyword == "async" {
                    j += 1;
                    if !tokens[j].is_ident("function") {
                        return Err(SyntaxError::new("Expected 'function' after 'async'", line));
                    }
                }
                let declared = if tokens[j].is_ident("class") { "class" } else { "function" };
                j += 1;
                if tokens[j].is_punct('*') {
                    j += 1;
                }
                match &tokens[j].kind {
                    TokenKind::Identifier(name) => {
                        syntax.add_export(name.clone(), line)?;
                        Ok(j + 1)
                    }
                    _ => Err(SyntaxError::new(
                        format!("Expected identifier after '{}'", declared),
                        tokens[j].line,
                    )),
                }
            }
            _ => Err(SyntaxError::new(
                format!("Unexpected token '{}' after 'export'", keyword),
                line,
            )),
        },
        other => Err(SyntaxError::new(
            format!("Unexpected token '{}' after 'export'", other),
            line,
        )),
    }
}

/// Statement keywords that end a declaration list written without `;`.
const STATEMENT_KEYWORDS: &[&str] = &[
    "const", "let", "var", "function", "class", "import", "export", "if", "for", "while", "do",
    "return", "throw", "switch", "try",
];

/// Records every declarator name of a `const`/`let`/`var` list.
///
/// Destructuring patterns are skipped. Returns the index of the token that
/// ends the list.
fn parse_declarators(
    tokens: &[Token],
    start: usize,
    depth: usize,
    syntax: &mut ModuleSyntax,
) -> Result<usize, SyntaxError> {
    let mut j = start;
    let mut expect_name = true;

    while j < tokens.len() {
        let token = &tokens[j];
        if token.kind == TokenKind::Eof {
            break;
        }
        if token.depth == depth {
            if expect_name {
                if let TokenKind::Identifier(name) = &token.kind {
                    syntax.add_export(name.clone(), token.line)?;
                }
                expect_name = false;
            } else if token.is_punct(',') {
                expect_name = true;
            } else if token.is_punct(';') || STATEMENT_KEYWORDS.iter().any(|k| token.is_ident(k)) {
                break;
            }
        }
        j += 1;
    }

    Ok(j)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(source: &str) -> ModuleSyntax {
        scan_module(source, true).unwrap()
    }

    fn error(source: &str) -> SyntaxError {
        scan_module(source, true).unwrap_err()
    }

    #[test]
    fn test_parse_imports() {
        let syntax = module(
            r#"
            import foo from 'foo';
            import { bar, baz as qux } from "./bar.js";
            import * as all from './all.js';
            import './side-effect.js';
            import again from 'foo';
        "#,
        );

        assert_eq!(syntax.imports, vec!["foo", "./bar.js", "./all.js", "./side-effect.js"]);
        assert!(syntax.exports.is_empty());
    }

    #[test]
    fn test_parse_exports() {
        let syntax = module(
            r#"
            export default function() {}
            export const answer = 42;
            export function helper() {}
            export async function* stream() {}
            export class Widget {}
            export { a, b as c };
        "#,
        );

        assert_eq!(
            syntax.exports,
            vec!["default", "answer", "helper", "stream", "Widget", "a", "c"]
        );
    }

    #[test]
    fn test_parse_re_exports() {
        let syntax = module(
            r#"
            export * from './all.js';
            export * as ns from './ns.js';
            export { x as y } from './x.js';
        "#,
        );

        assert_eq!(syntax.imports, vec!["./all.js", "./ns.js", "./x.js"]);
        assert_eq!(syntax.exports, vec!["*", "ns", "y"]);
    }

    #[test]
    fn test_dynamic_import_and_meta_are_not_static() {
        let syntax = module("const m = import('./lazy.js');\nconsole.log(import.meta.url);\n");
        assert!(syntax.imports.is_empty());
    }

    #[test]
    fn test_nested_keywords_are_ignored() {
        let syntax = module("const o = { import: 1, export: 2 };\nfoo.import('x');\n");
        assert_eq!(syntax, ModuleSyntax::default());
    }

    #[test]
    fn test_strings_comments_and_templates_hide_keywords() {
        let syntax = module(
            "// import a from 'a';\n/* export const b = 1; */\nconst s = \"import c from 'c'\";\nconst t = `export ${ {d: 1}.d } {`;\n",
        );
        assert_eq!(syntax, ModuleSyntax::default());
    }

    #[test]
    fn test_regex_literal_with_brackets() {
        let syntax = module("const re = /[)}]+/g;\nexport const x = re;\n");
        assert_eq!(syntax.exports, vec!["x"]);
    }

    #[test]
    fn test_division_is_not_regex() {
        let syntax = module("const half = total / 2 / 1;\nexport { half };\n");
        assert_eq!(syntax.exports, vec!["half"]);
    }

    #[test]
    fn test_division_after_postfix_update() {
        let syntax = module("let i = 4;\nlet h = i++ / 2;\nlet k = i-- / 2 / 1;\nexport { h, k };\n");
        assert_eq!(syntax.exports, vec!["h", "k"]);

        // A single `+` still allows a regex
        let syntax = module("let n = i++ + /x/.source.length;\nexport { n };\n");
        assert_eq!(syntax.exports, vec!["n"]);
    }

    #[test]
    fn test_crlf_line_continuation_in_string() {
        let syntax = module("export const s = 'a\\\r\nb';\r\nexport const t = \"c\\\rd\";\r\n");
        assert_eq!(syntax.exports, vec!["s", "t"]);
    }

    #[test]
    fn test_export_declarator_list() {
        let syntax = module(
            r#"
            export const a = 1, b = [2, 3], c = f(4, 5);
            export let { d, e } = obj, g = 6
            export var h
            export function i() {}
        "#,
        );
        assert_eq!(syntax.exports, vec!["a", "b", "c", "g", "h", "i"]);
    }

    #[test]
    fn test_unbalanced_brackets() {
        let err = error("function f() {\n  return 1;\n");
        assert_eq!(err.line, 1);
        assert!(err.message.starts_with("Unexpected end of input"));

        let err = error("let a = (1]);");
        assert_eq!(err.message, "Unexpected token ']'");
    }

    #[test]
    fn test_unterminated_literals() {
        assert_eq!(error("const s = 'abc\n';").message, "Unterminated string literal");
        assert_eq!(error("/* never closed").message, "Unterminated comment");
        assert_eq!(error("const t = `abc").message, "Unterminated template literal");
    }

    #[test]
    fn test_malformed_declarations() {
        assert_eq!(error("import x;").message, "Expected 'from' after import clause");
        assert_eq!(
            error("import x from y;").message,
            "Expected module specifier string, found 'y'"
        );
        assert_eq!(error("export 42;").message, "Unexpected token 'number' after 'export'");
        assert_eq!(error("export function () {}").message, "Expected identifier after 'function'");
    }

    #[test]
    fn test_duplicate_export() {
        let err = error("export const a = 1;\nexport { a };\n");
        assert_eq!(err.message, "Duplicate export of 'a'");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_script_rejects_module_syntax() {
        let err = scan_module("import a from './a.js';", false).unwrap_err();
        assert_eq!(err.message, "Cannot use import statement outside a module");

        let err = scan_module("export const a = 1;", false).unwrap_err();
        assert_eq!(err.message, "Unexpected token 'export'");

        assert!(scan_module("const lazy = import('./a.js');", false).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = error("\n\nlet s = 'open");
        assert_eq!(err.to_string(), "Unterminated string literal (line 3)");
    }
}
