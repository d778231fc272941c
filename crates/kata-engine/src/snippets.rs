//! Compilation gateway and the reference snippet compiler.
//!
//! The gateway contract is small: compile the submitted source, forward every
//! compiler warning to the output channel exactly once and in order before
//! returning, and let compile failures propagate unchanged.
//!
//! The reference compiler understands a minimal operation-snippet language:
//!
//! ```text
//! operation StateFlip (q : Qubit) : Unit is Adj + Ctl {
//!     X(q);
//! }
//! ```
//!
//! Bodies are sequences of gate applications over the declared qubit
//! parameters. Successful compilation registers every declared callable in
//! the shared [`SnippetStore`], replacing earlier entries with the same name.

use std::collections::BTreeMap;
use std::sync::Arc;

use kata_grader_types::{Gate, GateCall, OperationBody, OperationInfo, OperationSignature};
use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::debug;

use crate::channel::OutputChannel;
use crate::errors::CompileError;
use crate::resolver::{CallableRegistry, Resolution};

/// Result of compiling one snippet: declared callables in source order, plus
/// warning strings. Owned by the gateway for the lifetime of one call.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    /// Callables declared by the snippet, in declaration order.
    pub callables: Vec<OperationInfo>,
    /// Warnings produced during compilation, in source order.
    pub warnings: Vec<String>,
}

/// The compiler service seam.
pub trait SnippetCompiler {
    /// Compile a block of submitted source text.
    fn compile(&mut self, source: &str) -> Result<CompiledUnit, CompileError>;
}

/// Compile a snippet and forward its warnings to the output channel.
///
/// Warnings are delivered before control returns; a [`CompileError`] from the
/// compiler propagates with nothing written.
pub fn compile_snippet(
    compiler: &mut dyn SnippetCompiler,
    channel: &Arc<dyn OutputChannel>,
    source: &str,
) -> Result<CompiledUnit, CompileError> {
    let unit = compiler.compile(source)?;
    for warning in &unit.warnings {
        channel.write_line(warning);
    }
    debug!(
        declared = unit.callables.len(),
        warnings = unit.warnings.len(),
        "compiled snippet"
    );
    Ok(unit)
}

// ============================================================================
// Shared callable store
// ============================================================================

/// In-memory registry of compiled callables, shared between the reference
/// compiler (writer) and the solution resolver (reader).
#[derive(Debug, Default)]
pub struct SnippetStore {
    ops: Mutex<BTreeMap<String, OperationInfo>>,
}

impl SnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callable, replacing any earlier entry with the same name.
    pub fn insert(&self, op: OperationInfo) {
        let mut ops = self.ops.lock();
        if ops.insert(op.name.clone(), op).is_some() {
            debug!("replaced previously compiled callable");
        }
    }

    /// Look up a callable by name.
    pub fn get(&self, name: &str) -> Option<OperationInfo> {
        self.ops.lock().get(name).cloned()
    }

    /// Number of registered callables.
    pub fn len(&self) -> usize {
        self.ops.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().is_empty()
    }
}

impl CallableRegistry for SnippetStore {
    fn resolve(&self, name: &str) -> Resolution {
        match self.get(name) {
            Some(op) => Resolution::Found(op),
            None => Resolution::NotFound,
        }
    }
}

// ============================================================================
// Reference compiler
// ============================================================================

/// Reference [`SnippetCompiler`] backed by a shared [`SnippetStore`].
pub struct SnippetParser {
    store: Arc<SnippetStore>,
}

impl SnippetParser {
    pub fn new(store: Arc<SnippetStore>) -> Self {
        SnippetParser { store }
    }
}

impl SnippetCompiler for SnippetParser {
    fn compile(&mut self, source: &str) -> Result<CompiledUnit, CompileError> {
        let unit = compile_source(source)?;
        for op in &unit.callables {
            self.store.insert(op.clone());
        }
        Ok(unit)
    }
}

/// Characteristics the snippet language recognizes after `is`.
const KNOWN_CHARACTERISTICS: &[&str] = &["Adj", "Ctl"];

fn compile_source(source: &str) -> Result<CompiledUnit, CompileError> {
    let cleaned = strip_comments(source);
    let mut callables: Vec<OperationInfo> = Vec::new();
    let mut warnings = Vec::new();

    let mut rest = cleaned.as_str();
    while let Some(offset) = find_keyword(rest, "operation") {
        rest = &rest[offset + "operation".len()..];
        let (op, next, mut op_warnings) = parse_declaration(rest)?;
        warnings.append(&mut op_warnings);
        if let Some(pos) = callables.iter().position(|c| c.name == op.name) {
            warnings.push(format!(
                "operation `{}` replaces an earlier declaration in this snippet",
                op.name
            ));
            callables.remove(pos);
        }
        callables.push(op);
        rest = next;
    }

    if callables.is_empty() {
        return Err(CompileError::NoDeclarations);
    }
    Ok(CompiledUnit {
        callables,
        warnings,
    })
}

/// Parse one declaration starting just after the `operation` keyword.
/// Returns the compiled operation, the unconsumed remainder, and warnings.
fn parse_declaration(input: &str) -> Result<(OperationInfo, &str, Vec<String>), CompileError> {
    let mut warnings = Vec::new();

    let rest = input.trim_start();
    let (name, rest) = take_ident(rest).ok_or_else(|| CompileError::MalformedDeclaration {
        detail: "expected operation name after `operation`".to_string(),
    })?;
    let name = name.to_string();

    let rest = expect_char(rest.trim_start(), '(').ok_or_else(|| {
        CompileError::MalformedDeclaration {
            detail: format!("expected `(` after operation name `{name}`"),
        }
    })?;
    let close = rest
        .find(')')
        .ok_or_else(|| CompileError::MalformedDeclaration {
            detail: format!("missing `)` in parameter list of `{name}`"),
        })?;
    let params = parse_params(&rest[..close], &name)?;
    let rest = &rest[close + 1..];

    let rest = expect_char(rest.trim_start(), ':').ok_or_else(|| {
        CompileError::MalformedDeclaration {
            detail: format!("missing return type on operation `{name}`"),
        }
    })?;
    let (ret, rest) =
        take_ident(rest.trim_start()).ok_or_else(|| CompileError::MalformedDeclaration {
            detail: format!("missing return type on operation `{name}`"),
        })?;
    if ret != "Unit" {
        return Err(CompileError::MalformedDeclaration {
            detail: format!("operation `{name}` must return Unit, found `{ret}`"),
        });
    }

    let rest = parse_characteristics(rest, &name, &mut warnings);

    let rest = expect_char(rest.trim_start(), '{').ok_or_else(|| {
        CompileError::MalformedDeclaration {
            detail: format!("missing body on operation `{name}`"),
        }
    })?;
    let (body_text, rest) =
        take_braced(rest).ok_or_else(|| CompileError::UnbalancedBraces {
            operation: name.clone(),
        })?;
    let body = parse_body(body_text, &name, &params)?;

    let op = OperationInfo {
        name,
        signature: OperationSignature { params },
        body,
    };
    Ok((op, rest, warnings))
}

fn parse_params(text: &str, operation: &str) -> Result<Vec<String>, CompileError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CompileError::MalformedDeclaration {
            detail: format!("operation `{operation}` declares no qubit parameters"),
        });
    }
    let mut params = Vec::new();
    for piece in text.split(',') {
        let (pname, ptype) =
            piece
                .split_once(':')
                .ok_or_else(|| CompileError::MalformedDeclaration {
                    detail: format!("parameter `{}` of `{operation}` is missing a type", piece.trim()),
                })?;
        let pname = pname.trim();
        if !is_ident(pname) {
            return Err(CompileError::MalformedDeclaration {
                detail: format!("invalid parameter name `{pname}` on `{operation}`"),
            });
        }
        if ptype.trim() != "Qubit" {
            return Err(CompileError::MalformedDeclaration {
                detail: format!("parameter `{pname}` of `{operation}` must have type Qubit"),
            });
        }
        if params.iter().any(|p| p == pname) {
            return Err(CompileError::MalformedDeclaration {
                detail: format!("duplicate parameter `{pname}` on `{operation}`"),
            });
        }
        params.push(pname.to_string());
    }
    Ok(params)
}

/// Consume an optional `is Adj + Ctl` clause, warning on unrecognized tokens.
fn parse_characteristics<'a>(input: &'a str, operation: &str, warnings: &mut Vec<String>) -> &'a str {
    let rest = input.trim_start();
    let Some((word, after)) = take_ident(rest) else {
        return input;
    };
    if word != "is" {
        return input;
    }
    let mut rest = after;
    loop {
        let trimmed = rest.trim_start();
        let Some((token, after)) = take_ident(trimmed) else {
            return rest;
        };
        if !KNOWN_CHARACTERISTICS.contains(&token) {
            warnings.push(format!(
                "ignoring unrecognized characteristic `{token}` on operation `{operation}`"
            ));
        }
        rest = after;
        let trimmed = rest.trim_start();
        match expect_char(trimmed, '+') {
            Some(after_plus) => rest = after_plus,
            None => return rest,
        }
    }
}

fn parse_body(
    text: &str,
    operation: &str,
    params: &[String],
) -> Result<OperationBody, CompileError> {
    let mut calls = Vec::new();
    for raw in text.split(';') {
        let stmt = raw.trim();
        if stmt.is_empty() {
            continue;
        }
        calls.push(parse_statement(stmt, operation, params)?);
    }
    Ok(OperationBody(calls))
}

fn parse_statement(
    stmt: &str,
    operation: &str,
    params: &[String],
) -> Result<GateCall, CompileError> {
    let malformed = || CompileError::MalformedStatement {
        statement: stmt.to_string(),
        operation: operation.to_string(),
    };

    let (gate_name, rest) = take_ident(stmt).ok_or_else(malformed)?;
    let rest = expect_char(rest.trim_start(), '(').ok_or_else(malformed)?;
    let close = rest.find(')').ok_or_else(malformed)?;
    if !rest[close + 1..].trim().is_empty() {
        return Err(malformed());
    }

    let gate = Gate::parse(gate_name).ok_or_else(|| CompileError::UnknownGate {
        name: gate_name.to_string(),
        operation: operation.to_string(),
    })?;

    let args_text = rest[..close].trim();
    let args: Vec<&str> = if args_text.is_empty() {
        Vec::new()
    } else {
        args_text.split(',').map(str::trim).collect()
    };
    if args.len() != gate.arity() {
        return Err(CompileError::WrongArity {
            gate: gate_name.to_string(),
            operation: operation.to_string(),
            expected: gate.arity(),
            got: args.len(),
        });
    }

    let mut targets: SmallVec<[u8; 2]> = SmallVec::new();
    for arg in args {
        let index = params.iter().position(|p| p == arg).ok_or_else(|| {
            CompileError::UnknownQubit {
                name: arg.to_string(),
                operation: operation.to_string(),
            }
        })?;
        targets.push(index as u8);
    }
    Ok(GateCall { gate, targets })
}

// ============================================================================
// Scanner helpers
// ============================================================================

fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.split_once("//").map_or(line, |(code, _)| code))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Find `keyword` as a standalone word; returns its byte offset.
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    for (idx, _) in text.match_indices(keyword) {
        let before_ok = idx == 0
            || !text[..idx]
                .chars()
                .next_back()
                .is_some_and(is_ident_char);
        let after = &text[idx + keyword.len()..];
        let after_ok = after.chars().next().is_some_and(char::is_whitespace);
        if before_ok && after_ok {
            return Some(idx);
        }
    }
    None
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_ident(text: &str) -> bool {
    !text.is_empty()
        && text.chars().all(is_ident_char)
        && !text.starts_with(|c: char| c.is_ascii_digit())
}

/// Split a leading identifier off `text`.
fn take_ident(text: &str) -> Option<(&str, &str)> {
    let end = text
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map_or(text.len(), |(i, _)| i);
    if end == 0 || text.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some((&text[..end], &text[end..]))
}

fn expect_char(text: &str, c: char) -> Option<&str> {
    text.strip_prefix(c)
}

/// Consume a brace-balanced block starting just after an opening `{`.
/// Returns the block content and the remainder after the closing `}`.
fn take_braced(text: &str) -> Option<(&str, &str)> {
    let mut depth = 1usize;
    for (idx, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[..idx], &text[idx + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}
