//! # AST transform (C2)
//!
//! The core algorithm (spec §4.2): walk every function body and rewrite
//! it so that each original statement is preceded by a `trace("LINE", ...)`
//! call and, when the statement is a bare call, wrapped in a matching
//! `trace("ENTER", ...)` / `trace("EXIT", ...)` pair.
//!
//! The transform is syntactic only — it never evaluates sub-expressions
//! and never reorders original statements (invariant 1, spec §8).

use std::collections::HashMap;
use std::collections::HashSet;

use crate::parser::ast::{
    Block, CompilationUnit, Expr, FunctionDecl, Import, SelectCase, Stmt, StmtKind, SwitchCase,
};

/// Import path of the trace helper (`tracewright-client`'s public entry
/// point), inserted once per transformed unit. Grounded on the original's
/// `insertPkg = "jeb/client"` (`examples/original_source/jeb.go`).
pub const TRACE_IMPORT_PATH: &str = "tracewright/client";
/// The selector base used in synthesised `trace(...)` calls —
/// `client.Trace(...)` in the original, kept as a bare `trace(...)` call
/// here since `.step` has no package-qualified call sugar beyond `.`.
pub const TRACE_CALL_NAME: &str = "trace";

/// Per-block set of identifiers assigned within that block (spec §4.2:
/// "carried forward for future use \[variable inspection\]... MUST NOT
/// influence emitted trace calls"). Collected but deliberately unread by
/// the stepping controller — the reserved slot for a future "inspect
/// variable" feature (spec §1 Non-goals).
pub type LocalScope = HashSet<String>;

/// Everything the transform produces: the rewritten unit plus the scope
/// report, keyed by function name, one `LocalScope` per block encountered
/// in that function, in the order each block finishes being rewritten
/// (nested blocks before their enclosing block).
pub struct TransformOutput {
    pub unit: CompilationUnit,
    pub scopes: HashMap<String, Vec<LocalScope>>,
}

/// Transform a whole compilation unit: add the trace-helper import, then
/// rewrite every function body (invariant 4: exactly one import added).
#[must_use]
pub fn transform_unit(unit: &CompilationUnit) -> TransformOutput {
    let mut imports = unit.imports.clone();
    imports.push(Import {
        path: TRACE_IMPORT_PATH.to_string(),
    });

    let mut scopes: HashMap<String, Vec<LocalScope>> = HashMap::new();
    let functions = unit
        .functions
        .iter()
        .map(|f| transform_function(f, &mut scopes))
        .collect();

    TransformOutput {
        unit: CompilationUnit {
            package_name: unit.package_name.clone(),
            imports,
            functions,
        },
        scopes,
    }
}

fn transform_function(
    func: &FunctionDecl,
    scopes: &mut HashMap<String, Vec<LocalScope>>,
) -> FunctionDecl {
    let block_scopes = scopes.entry(func.name.clone()).or_default();
    FunctionDecl {
        name: func.name.clone(),
        params: func.params.clone(),
        body: transform_block(&func.body, &func.name, block_scopes),
    }
}

/// Rewrite one block (spec §4.2 "Block rewrite"). Empty blocks stay empty
/// (invariant 9: "there is nothing to step").
fn transform_block(block: &Block, function: &str, block_scopes: &mut Vec<LocalScope>) -> Block {
    if block.is_empty() {
        return Vec::new();
    }

    let mut scope = LocalScope::new();
    let mut out = Vec::with_capacity(block.len() * 2);

    for stmt in block {
        if let StmtKind::Assign { targets, .. } = &stmt.kind {
            scope.extend(targets.iter().cloned());
        }

        out.push(make_line_trace(stmt, function));

        let bare_callee = stmt
            .as_bare_call()
            .and_then(Expr::rightmost_ident)
            .map(str::to_string);

        if let Some(callee) = &bare_callee {
            out.push(make_enter_trace(stmt, callee));
        }

        out.push(recurse_into(stmt, function, block_scopes));

        if let Some(callee) = &bare_callee {
            out.push(make_exit_trace(stmt, callee));
        }
    }

    block_scopes.push(scope);
    out
}

/// Statement 3 of the rewrite: `S` itself, with any nested blocks (branch
/// arms, loop body, switch/select arms) recursively rewritten in place
/// (spec §4.2 step 5). Statement kinds with no nested block pass through
/// unmodified — including `StmtKind::Other`, treated as a leaf per the
/// "AST walks as pattern matching" design note.
fn recurse_into(stmt: &Stmt, function: &str, block_scopes: &mut Vec<LocalScope>) -> Stmt {
    let kind = match &stmt.kind {
        StmtKind::If {
            cond,
            then_block,
            else_block,
        } => StmtKind::If {
            cond: cond.clone(),
            then_block: transform_block(then_block, function, block_scopes),
            else_block: else_block
                .as_ref()
                .map(|b| transform_block(b, function, block_scopes)),
        },
        StmtKind::For { cond, body } => StmtKind::For {
            cond: cond.clone(),
            body: transform_block(body, function, block_scopes),
        },
        StmtKind::Switch { tag, cases } => StmtKind::Switch {
            tag: tag.clone(),
            cases: cases
                .iter()
                .map(|c| transform_switch_case(c, function, block_scopes))
                .collect(),
        },
        StmtKind::Select { cases } => StmtKind::Select {
            cases: cases
                .iter()
                .map(|c| transform_select_case(c, function, block_scopes))
                .collect(),
        },
        other => other.clone(),
    };
    Stmt::new(kind, stmt.position.clone())
}

fn transform_switch_case(
    case: &SwitchCase,
    function: &str,
    block_scopes: &mut Vec<LocalScope>,
) -> SwitchCase {
    SwitchCase {
        values: case.values.clone(),
        is_default: case.is_default,
        body: transform_block(&case.body, function, block_scopes),
    }
}

fn transform_select_case(
    case: &SelectCase,
    function: &str,
    block_scopes: &mut Vec<LocalScope>,
) -> SelectCase {
    SelectCase {
        comm: case.comm.clone(),
        body: transform_block(&case.body, function, block_scopes),
    }
}

fn make_line_trace(stmt: &Stmt, function: &str) -> Stmt {
    let call = call_expr(vec![
        Expr::Str("LINE".to_string()),
        Expr::Str(stmt.position.filename.clone()),
        Expr::Str(stmt.position.line.to_string()),
        Expr::Str(function.to_string()),
    ]);
    Stmt::new(StmtKind::Expr(call), stmt.position.clone())
}

fn make_enter_trace(stmt: &Stmt, callee: &str) -> Stmt {
    let call = call_expr(vec![
        Expr::Str("ENTER".to_string()),
        Expr::Str(callee.to_string()),
    ]);
    Stmt::new(StmtKind::Expr(call), stmt.position.clone())
}

fn make_exit_trace(stmt: &Stmt, callee: &str) -> Stmt {
    let call = call_expr(vec![
        Expr::Str("EXIT".to_string()),
        Expr::Str(callee.to_string()),
    ]);
    Stmt::new(StmtKind::Expr(call), stmt.position.clone())
}

fn call_expr(args: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(Expr::Ident(TRACE_CALL_NAME.to_string())),
        args,
    }
}
