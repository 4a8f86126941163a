//! # Emitter (C4)
//!
//! Pretty-prints a (possibly transformed) [`CompilationUnit`] to a
//! deterministic location under a scratch root (spec §4.3):
//! `<scratch_root>/src/<package-name>/unit.step`. The directory is created
//! with `rwx------` (a per-user temp tree, never shared), and any
//! previous output for the same package is overwritten.
//!
//! This module also doubles as the `.step` "language's... pretty-printer"
//! that spec §1 treats as an external collaborator: since `.step` is our
//! own stand-in language rather than a real one, we own both ends.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::error::InstrumentError;
use crate::parser::ast::{
    CompilationUnit, Expr, FunctionDecl, Import, SelectCase, Stmt, StmtKind, SwitchCase,
};

/// Stable output file name: one instrumented file per merged package,
/// regardless of how many source files were folded into it (spec §4.3).
pub const UNIT_FILE_NAME: &str = "unit.step";

/// Recursion guard for the pretty-printer. Exceeding it is treated as a
/// pretty-print failure (spec §4.2 "Failure semantics": "a pretty-print
/// failure falls back to a raw AST dump") rather than a stack overflow.
const MAX_NESTING_DEPTH: usize = 256;

/// Emit `unit` under `scratch_root`, returning the path written.
///
/// On a pretty-print failure the raw AST is dumped to the same path, the
/// error is logged, and `Err` is still returned — the instrumentor exits
/// non-zero either way (spec §4.2, §7).
pub fn emit(unit: &CompilationUnit, scratch_root: &Path) -> Result<PathBuf, InstrumentError> {
    ensure_scratch_root(scratch_root)?;

    let out_dir = scratch_root.join("src").join(&unit.package_name);
    std::fs::create_dir_all(&out_dir).map_err(|source| InstrumentError::Io {
        path: out_dir.display().to_string(),
        source,
    })?;
    let out_path = out_dir.join(UNIT_FILE_NAME);

    match pretty_print(unit) {
        Ok(text) => {
            write_file(&out_path, &text)?;
            Ok(out_path)
        }
        Err(reason) => {
            tracing::error!(package = %unit.package_name, %reason, "pretty-print failed, falling back to raw AST dump");
            let dump = format!("{unit:#?}\n");
            write_file(&out_path, &dump)?;
            Err(InstrumentError::PrettyPrint {
                package: unit.package_name.clone(),
                reason,
            })
        }
    }
}

fn ensure_scratch_root(scratch_root: &Path) -> Result<(), InstrumentError> {
    std::fs::create_dir_all(scratch_root).map_err(|source| InstrumentError::Io {
        path: scratch_root.display().to_string(),
        source,
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        std::fs::set_permissions(scratch_root, perms).map_err(|source| InstrumentError::Io {
            path: scratch_root.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), InstrumentError> {
    let mut f = std::fs::File::create(path).map_err(|source| InstrumentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    f.write_all(contents.as_bytes())
        .map_err(|source| InstrumentError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Pretty-print a whole unit back to `.step` source text.
pub fn pretty_print(unit: &CompilationUnit) -> Result<String, String> {
    let mut out = String::new();
    for import in &unit.imports {
        print_import(import, &mut out);
    }
    if !unit.imports.is_empty() {
        out.push('\n');
    }
    for (i, func) in unit.functions.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        print_function(func, &mut out)?;
    }
    Ok(out)
}

fn print_import(import: &Import, out: &mut String) {
    out.push_str("import ");
    out.push_str(&quote_string(&import.path));
    out.push_str(";\n");
}

fn print_function(func: &FunctionDecl, out: &mut String) -> Result<(), String> {
    out.push_str("func ");
    out.push_str(&func.name);
    out.push('(');
    out.push_str(&func.params.join(", "));
    out.push_str(") {\n");
    print_block(&func.body, 1, 0, out)?;
    out.push_str("}\n");
    Ok(())
}

fn print_block(block: &[Stmt], indent: usize, depth: usize, out: &mut String) -> Result<(), String> {
    if depth > MAX_NESTING_DEPTH {
        return Err(format!("nesting depth exceeded {MAX_NESTING_DEPTH}"));
    }
    for stmt in block {
        print_stmt(stmt, indent, depth, out)?;
    }
    Ok(())
}

fn push_indent(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("    ");
    }
}

fn print_stmt(stmt: &Stmt, indent: usize, depth: usize, out: &mut String) -> Result<(), String> {
    push_indent(indent, out);
    match &stmt.kind {
        StmtKind::Expr(e) => {
            out.push_str(&print_expr(e));
            out.push_str(";\n");
        }
        StmtKind::Assign {
            targets,
            define,
            value,
        } => {
            out.push_str(&targets.join(", "));
            out.push_str(if *define { " := " } else { " = " });
            out.push_str(&print_expr(value));
            out.push_str(";\n");
        }
        StmtKind::If {
            cond,
            then_block,
            else_block,
        } => {
            out.push_str("if ");
            out.push_str(&print_expr(cond));
            out.push_str(" {\n");
            print_block(then_block, indent + 1, depth + 1, out)?;
            push_indent(indent, out);
            out.push('}');
            if let Some(else_block) = else_block {
                out.push_str(" else {\n");
                print_block(else_block, indent + 1, depth + 1, out)?;
                push_indent(indent, out);
                out.push('}');
            }
            out.push('\n');
        }
        StmtKind::For { cond, body } => {
            out.push_str("for");
            if let Some(cond) = cond {
                out.push(' ');
                out.push_str(&print_expr(cond));
            }
            out.push_str(" {\n");
            print_block(body, indent + 1, depth + 1, out)?;
            push_indent(indent, out);
            out.push_str("}\n");
        }
        StmtKind::Switch { tag, cases } => {
            out.push_str("switch ");
            out.push_str(&print_expr(tag));
            out.push_str(" {\n");
            for case in cases {
                print_switch_case(case, indent + 1, depth + 1, out)?;
            }
            push_indent(indent, out);
            out.push_str("}\n");
        }
        StmtKind::Select { cases } => {
            out.push_str("select {\n");
            for case in cases {
                print_select_case(case, indent + 1, depth + 1, out)?;
            }
            push_indent(indent, out);
            out.push_str("}\n");
        }
        StmtKind::Return(value) => {
            out.push_str("return");
            if let Some(value) = value {
                out.push(' ');
                out.push_str(&print_expr(value));
            }
            out.push_str(";\n");
        }
        StmtKind::Other(text) => {
            out.push_str(text);
            out.push_str(";\n");
        }
    }
    Ok(())
}

fn print_switch_case(
    case: &SwitchCase,
    indent: usize,
    depth: usize,
    out: &mut String,
) -> Result<(), String> {
    push_indent(indent, out);
    if case.is_default {
        out.push_str("default:\n");
    } else {
        out.push_str("case ");
        out.push_str(
            &case
                .values
                .iter()
                .map(print_expr)
                .collect::<Vec<_>>()
                .join(", "),
        );
        out.push_str(":\n");
    }
    print_block(&case.body, indent + 1, depth + 1, out)
}

fn print_select_case(
    case: &SelectCase,
    indent: usize,
    depth: usize,
    out: &mut String,
) -> Result<(), String> {
    push_indent(indent, out);
    if case.comm == "default" {
        out.push_str("default:\n");
    } else {
        out.push_str("case ");
        out.push_str(&case.comm);
        out.push_str(":\n");
    }
    print_block(&case.body, indent + 1, depth + 1, out)
}

fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Number(n) => n.to_string(),
        Expr::Str(s) => quote_string(s),
        Expr::Selector { base, sel } => format!("{}.{}", print_expr(base), sel),
        Expr::Call { callee, args } => format!(
            "{}({})",
            print_expr(callee),
            args.iter().map(print_expr).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
