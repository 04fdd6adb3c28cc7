#[cfg(test)]
mod resolver_tests {
    use treelox as lox;

    use lox::driver;
    use lox::parser::Parser;
    use lox::reporter::{CollectingReporter, ErrorReporter};
    use lox::resolver::Resolver;

    /// Scan, parse, and resolve; returns the resolution diagnostics only.
    fn resolve_diagnostics(source: &str) -> Vec<String> {
        let mut reporter = CollectingReporter::new();
        let tokens = driver::scan(source.as_bytes(), &mut reporter);

        let mut parser = Parser::new(&tokens, &mut reporter);
        let statements = parser.parse();

        assert!(!reporter.had_error(), "source must parse cleanly");

        Resolver::new(&mut reporter).resolve(&statements);

        reporter.messages().iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_resolver_01_clean_programs() {
        assert!(resolve_diagnostics("var a = 1; { var a = 2; print a; }").is_empty());
        assert!(resolve_diagnostics("fun f(x) { return x; } print f(1);").is_empty());
        assert!(resolve_diagnostics("class A { m() { return this; } }").is_empty());
        assert!(
            resolve_diagnostics("class A { m() {} } class B < A { m() { return super.m(); } }")
                .is_empty()
        );
    }

    #[test]
    fn test_resolver_02_read_in_own_initializer() {
        assert_eq!(
            resolve_diagnostics("var a = 1; { var a = a; }"),
            vec!["Can't read local variable in its own initialiser."]
        );
    }

    #[test]
    fn test_resolver_03_duplicate_local() {
        assert_eq!(
            resolve_diagnostics("{ var a = 1; var a = 2; }"),
            vec!["Already a variable with this name in this scope."]
        );

        // Global redeclaration is legal.
        assert!(resolve_diagnostics("var a = 1; var a = 2;").is_empty());
    }

    #[test]
    fn test_resolver_04_top_level_return() {
        assert_eq!(
            resolve_diagnostics("return 1;"),
            vec!["Can't return from top-level code."]
        );
    }

    #[test]
    fn test_resolver_05_return_value_from_initializer() {
        assert_eq!(
            resolve_diagnostics("class A { init() { return 1; } }"),
            vec!["Can't return from an initialiser."]
        );

        // A bare return in init is allowed.
        assert!(resolve_diagnostics("class A { init() { return; } }").is_empty());
    }

    #[test]
    fn test_resolver_06_this_outside_class() {
        assert_eq!(
            resolve_diagnostics("print this;"),
            vec!["Can't use 'this' outside of a class."]
        );

        assert_eq!(
            resolve_diagnostics("fun f() { return this; }"),
            vec!["Can't use 'this' outside of a class."]
        );
    }

    #[test]
    fn test_resolver_07_self_inheritance() {
        assert_eq!(
            resolve_diagnostics("class A < A { }"),
            vec!["A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_resolver_08_super_misuse() {
        assert_eq!(
            resolve_diagnostics("print super.m;"),
            vec!["Can't use 'super' outside of a class."]
        );

        assert_eq!(
            resolve_diagnostics("class A { m() { return super.m(); } }"),
            vec!["Can't use 'super' in a class with no superclass."]
        );
    }

    #[test]
    fn test_resolver_09_accumulates_multiple_errors() {
        let diags = resolve_diagnostics("return 1;\nprint this;\n{ var x = 1; var x = 2; }");

        assert_eq!(
            diags,
            vec![
                "Can't return from top-level code.",
                "Can't use 'this' outside of a class.",
                "Already a variable with this name in this scope.",
            ]
        );
    }

    #[test]
    fn test_resolver_10_function_scope_nesting() {
        // Params live in the function scope; shadowing a param in a nested
        // block is a different scope and therefore fine.
        assert!(resolve_diagnostics("fun f(a) { { var a = 2; } return a; }").is_empty());

        // Redeclaring a param in the same body scope is not.
        assert_eq!(
            resolve_diagnostics("fun f(a) { var a = 2; }"),
            vec!["Already a variable with this name in this scope."]
        );
    }
}
