#[cfg(test)]
mod scanner_tests {
    use treelox as lox;

    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_ternary_punctuation() {
        assert_token_sequence(
            "a ? b : c",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::QUESTION, "?"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::COLON, ":"),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_maximal_munch() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_keywords_and_identifiers() {
        assert_token_sequence(
            "var class supers fun_ _if",
            &[
                (TokenType::VAR, "var"),
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "supers"),
                (TokenType::IDENTIFIER, "fun_"),
                (TokenType::IDENTIFIER, "_if"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_comments_and_whitespace() {
        assert_token_sequence(
            "// nothing here\n( // trailing\n)",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_06_number_literals() {
        let scanner = Scanner::new("123 3.14 123.");
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert!(matches!(tokens[0].token_type, TokenType::NUMBER(n) if n == 123.0));
        assert!(matches!(tokens[1].token_type, TokenType::NUMBER(n) if n == 3.14));

        // "123." is NUMBER then DOT, never a fractional literal.
        assert!(matches!(tokens[2].token_type, TokenType::NUMBER(n) if n == 123.0));
        assert_eq!(tokens[3].token_type, TokenType::DOT);
    }

    #[test]
    fn test_scanner_07_string_literal_and_lines() {
        let scanner = Scanner::new("\"one\ntwo\" x");
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "one\ntwo"),
            other => panic!("expected string, got {:?}", other),
        }

        // The newline inside the string counts.
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_scanner_08_unexpected_chars_interleaved() {
        let source = ",.$(#";
        let scanner = Scanner::new(source);

        let results: Vec<_> = scanner.collect();

        // COMMA, DOT, error '$', LEFT_PAREN, error '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_eq!(results[0].as_ref().unwrap().token_type, TokenType::COMMA);
        assert_eq!(results[1].as_ref().unwrap().token_type, TokenType::DOT);
        assert_eq!(
            results[3].as_ref().unwrap().token_type,
            TokenType::LEFT_PAREN
        );
        assert_eq!(results[5].as_ref().unwrap().token_type, TokenType::EOF);

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(errors.len(), 2, "Expected 2 error messages");
        assert_eq!(errors[0], "[line 1] Error: Unexpected character: $");
        assert_eq!(errors[1], "[line 1] Error: Unexpected character: #");
    }

    #[test]
    fn test_scanner_09_unterminated_string() {
        let scanner = Scanner::new("\"abc");
        let results: Vec<_> = scanner.collect();

        let err = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("unterminated string must error");

        assert_eq!(err.to_string(), "[line 1] Error: Unterminated string.");

        // The stream still ends with a single EOF.
        assert_eq!(
            results.last().unwrap().as_ref().unwrap().token_type,
            TokenType::EOF
        );
    }

    #[test]
    fn test_scanner_10_empty_source() {
        let scanner = Scanner::new("");
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_11_token_display() {
        let scanner = Scanner::new("42 3.5 \"hi\" foo");
        let rendered: Vec<String> = scanner
            .filter_map(Result::ok)
            .map(|t| t.to_string())
            .collect();

        assert_eq!(rendered[0], "NUMBER 42 42.0");
        assert_eq!(rendered[1], "NUMBER 3.5 3.5");
        assert_eq!(rendered[2], "STRING \"hi\" hi");
        assert_eq!(rendered[3], "IDENTIFIER foo null");
        assert_eq!(rendered[4], "EOF  null");
    }

    #[test]
    fn test_scanner_12_huge_integral_number_display() {
        // Integral but beyond i64: the display must not saturate.
        let scanner = Scanner::new("1000000000000000000000");
        let rendered: Vec<String> = scanner
            .filter_map(Result::ok)
            .map(|t| t.to_string())
            .collect();

        assert_eq!(
            rendered[0],
            "NUMBER 1000000000000000000000 1000000000000000000000"
        );
    }

    #[test]
    fn test_scanner_13_invalid_utf8_is_a_lex_error() {
        use lox::driver;
        use lox::reporter::{CollectingReporter, ErrorReporter};

        let mut reporter = CollectingReporter::new();
        let tokens = driver::scan(b"var a = 1;\nprint \"\xFF\";", &mut reporter);

        assert!(reporter.had_error());
        assert_eq!(reporter.diagnostics.len(), 1);
        assert_eq!(reporter.diagnostics[0].line, 2);
        assert_eq!(reporter.diagnostics[0].message, "Invalid UTF-8 sequence.");

        // The buffer still ends with a single EOF so later phases stay sane.
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);
    }
}
