#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::lexer::tokenize;
    use crate::parser::ast::{Expr, StmtKind};
    use crate::parser::parse_unit;

    fn parse_ok(src: &str) -> crate::parser::ast::CompilationUnit {
        let lexed = tokenize(src);
        assert!(lexed.errors.is_empty(), "lexer errors: {:?}", lexed.errors);
        let parsed = parse_unit(&lexed.tokens, "unit.step", "main");
        assert!(
            parsed.errors.is_empty(),
            "parser errors: {:?}",
            parsed.errors
        );
        parsed.unit
    }

    fn parse_errors(src: &str) -> Vec<ErrorKind> {
        let lexed = tokenize(src);
        let parsed = parse_unit(&lexed.tokens, "unit.step", "main");
        parsed.errors.into_iter().map(|e| e.kind).collect()
    }

    fn only_fn_body(src: &str) -> Vec<StmtKind> {
        let unit = parse_ok(src);
        assert_eq!(unit.functions.len(), 1);
        unit.functions[0]
            .body
            .iter()
            .map(|s| s.kind.clone())
            .collect()
    }

    #[test]
    fn empty_unit_has_no_imports_or_functions() {
        let unit = parse_ok("");
        assert!(unit.imports.is_empty());
        assert!(unit.functions.is_empty());
    }

    #[test]
    fn package_name_comes_from_the_caller_not_the_source() {
        let lexed = tokenize("func main() {}");
        let parsed = parse_unit(&lexed.tokens, "unit.step", "widgets");
        assert_eq!(parsed.unit.package_name, "widgets");
    }

    #[test]
    fn single_import_is_recorded() {
        let unit = parse_ok(r#"import "fmt";"#);
        assert_eq!(unit.imports.len(), 1);
        assert_eq!(unit.imports[0].path, "fmt");
    }

    #[test]
    fn multiple_imports_precede_functions() {
        let unit = parse_ok(
            r#"
            import "fmt";
            import "os";
            func main() {}
            "#,
        );
        assert_eq!(unit.imports.len(), 2);
        assert_eq!(unit.imports[0].path, "fmt");
        assert_eq!(unit.imports[1].path, "os");
        assert_eq!(unit.functions.len(), 1);
    }

    #[test]
    fn function_with_no_params_and_empty_body() {
        let unit = parse_ok("func main() {}");
        let f = &unit.functions[0];
        assert_eq!(f.name, "main");
        assert!(f.params.is_empty());
        assert!(f.body.is_empty());
    }

    #[test]
    fn function_params_are_comma_separated_identifiers() {
        let unit = parse_ok("func add(a, b) { return a; }");
        assert_eq!(unit.functions[0].params, vec!["a", "b"]);
    }

    #[test]
    fn bare_call_statement_is_an_expr_stmt() {
        let body = only_fn_body("func main() { doWork(); }");
        match &body[0] {
            StmtKind::Expr(Expr::Call { callee, args }) => {
                assert_eq!(callee.rightmost_ident(), Some("doWork"));
                assert!(args.is_empty());
            }
            other => panic!("expected a bare call, got {other:?}"),
        }
    }

    #[test]
    fn selector_call_carries_its_rightmost_ident() {
        let body = only_fn_body(r#"func main() { fmt.Println("hi"); }"#);
        match &body[0] {
            StmtKind::Expr(Expr::Call { callee, args }) => {
                assert_eq!(callee.rightmost_ident(), Some("Println"));
                assert_eq!(args.len(), 1);
                assert!(matches!(&args[0], Expr::Str(s) if s == "hi"));
            }
            other => panic!("expected a selector call, got {other:?}"),
        }
    }

    #[test]
    fn define_assignment_sets_the_define_flag() {
        let body = only_fn_body("func main() { x := 1; }");
        match &body[0] {
            StmtKind::Assign {
                targets,
                define,
                value,
            } => {
                assert_eq!(targets, &["x"]);
                assert!(define);
                assert!(matches!(value, Expr::Number(1)));
            }
            other => panic!("expected an assignment, got {other:?}"),
        }
    }

    #[test]
    fn plain_assignment_clears_the_define_flag() {
        let body = only_fn_body("func main() { x := 1; x = 2; }");
        match &body[1] {
            StmtKind::Assign { define, .. } => assert!(!define),
            other => panic!("expected an assignment, got {other:?}"),
        }
    }

    #[test]
    fn multi_target_assignment_is_comma_separated() {
        let body = only_fn_body("func main() { a, b := f(); }");
        match &body[0] {
            StmtKind::Assign { targets, .. } => assert_eq!(targets, &["a", "b"]),
            other => panic!("expected an assignment, got {other:?}"),
        }
    }

    #[test]
    fn an_identifier_statement_without_a_define_or_assign_is_an_expr_stmt_not_an_assignment() {
        // `is_assignment_ahead` must not misfire on a bare identifier call.
        let body = only_fn_body("func main() { x(); }");
        assert!(matches!(body[0], StmtKind::Expr(Expr::Call { .. })));
    }

    #[test]
    fn if_without_else() {
        let body = only_fn_body("func main() { if cond() { doThing(); } }");
        match &body[0] {
            StmtKind::If {
                then_block,
                else_block,
                ..
            } => {
                assert_eq!(then_block.len(), 1);
                assert!(else_block.is_none());
            }
            other => panic!("expected an if, got {other:?}"),
        }
    }

    #[test]
    fn if_with_else() {
        let body = only_fn_body("func main() { if cond() { a(); } else { b(); } }");
        match &body[0] {
            StmtKind::If { else_block, .. } => {
                assert_eq!(else_block.as_ref().unwrap().len(), 1);
            }
            other => panic!("expected an if, got {other:?}"),
        }
    }

    #[test]
    fn for_with_condition() {
        let body = only_fn_body("func main() { for running() { tick(); } }");
        match &body[0] {
            StmtKind::For { cond, body } => {
                assert!(cond.is_some());
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected a for, got {other:?}"),
        }
    }

    #[test]
    fn for_without_condition_is_an_infinite_loop() {
        let body = only_fn_body("func main() { for { tick(); } }");
        match &body[0] {
            StmtKind::For { cond, .. } => assert!(cond.is_none()),
            other => panic!("expected a for, got {other:?}"),
        }
    }

    #[test]
    fn switch_with_case_and_default() {
        let body = only_fn_body(
            r#"
            func main() {
                switch x {
                case 1:
                    one();
                case 2, 3:
                    two();
                default:
                    other();
                }
            }
            "#,
        );
        match &body[0] {
            StmtKind::Switch { cases, .. } => {
                assert_eq!(cases.len(), 3);
                assert_eq!(cases[0].values.len(), 1);
                assert!(!cases[0].is_default);
                assert_eq!(cases[1].values.len(), 2);
                assert!(cases[2].is_default);
                assert!(cases[2].values.is_empty());
            }
            other => panic!("expected a switch, got {other:?}"),
        }
    }

    #[test]
    fn select_with_case_and_default_keeps_comm_clause_as_raw_text() {
        let body = only_fn_body(
            r#"
            func main() {
                select {
                case x := <-ch:
                    useX();
                default:
                    idle();
                }
            }
            "#,
        );
        match &body[0] {
            StmtKind::Select { cases } => {
                assert_eq!(cases.len(), 2);
                assert!(!cases[0].comm.is_empty());
                assert_eq!(cases[1].comm, "default");
            }
            other => panic!("expected a select, got {other:?}"),
        }
    }

    #[test]
    fn return_with_value() {
        let body = only_fn_body("func main() { return 1; }");
        assert!(matches!(body[0], StmtKind::Return(Some(Expr::Number(1)))));
    }

    #[test]
    fn return_without_value() {
        let body = only_fn_body("func main() { return; }");
        assert!(matches!(body[0], StmtKind::Return(None)));
    }

    #[test]
    fn nested_blocks_parse_recursively() {
        let body = only_fn_body(
            r#"
            func main() {
                if a() {
                    for b() {
                        c();
                    }
                }
            }
            "#,
        );
        match &body[0] {
            StmtKind::If { then_block, .. } => match &then_block[0].kind {
                StmtKind::For { body, .. } => {
                    assert!(matches!(body[0].kind, StmtKind::Expr(Expr::Call { .. })));
                }
                other => panic!("expected a for, got {other:?}"),
            },
            other => panic!("expected an if, got {other:?}"),
        }
    }

    #[test]
    fn missing_semicolon_is_a_parse_error() {
        let errors = parse_errors("func main() { x := 1 }");
        assert!(!errors.is_empty());
    }

    #[test]
    fn missing_closing_brace_is_a_parse_error() {
        let errors = parse_errors("func main() { doWork();");
        assert!(!errors.is_empty());
    }

    #[test]
    fn garbage_at_top_level_is_a_parse_error_and_recovers() {
        let errors = parse_errors("???\nfunc main() {}");
        assert!(!errors.is_empty());
    }

    #[test]
    fn malformed_function_still_lets_parsing_continue_afterward() {
        // The synchronize() recovery should let a later, well-formed
        // function still parse after an earlier one fails.
        let lexed = tokenize("func () {} func main() {}");
        let parsed = parse_unit(&lexed.tokens, "unit.step", "main");
        assert!(!parsed.errors.is_empty());
        assert!(parsed.unit.functions.iter().any(|f| f.name == "main"));
    }
}
