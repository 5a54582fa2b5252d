#[cfg(test)]
mod scanner_tests {
    use toyc::scanner::*;
    use toyc::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<Token> = scanner.collect();

        let actual: Vec<(TokenType, &str)> =
            tokens.iter().map(|t| (t.token_type, t.lexeme)).collect();

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})[];?:",
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
                (TokenType::LEFT_BRACKET, "["),
                (TokenType::RIGHT_BRACKET, "]"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::QUESTION, "?"),
                (TokenType::COLON, ":"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_compound_operators() {
        assert_token_sequence(
            "!= == <= >= += ++ -= -- *= /= %= => <| |> && || ...",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::PLUS_EQUAL, "+="),
                (TokenType::PLUS_PLUS, "++"),
                (TokenType::MINUS_EQUAL, "-="),
                (TokenType::MINUS_MINUS, "--"),
                (TokenType::STAR_EQUAL, "*="),
                (TokenType::SLASH_EQUAL, "/="),
                (TokenType::MODULO_EQUAL, "%="),
                (TokenType::EQUAL_GREATER, "=>"),
                (TokenType::LESS_OR, "<|"),
                (TokenType::OR_GREATER, "|>"),
                (TokenType::AND_AND, "&&"),
                (TokenType::OR_OR, "||"),
                (TokenType::DOT_DOT_DOT, "..."),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "var variable nil nil_ print foreach for _x9",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "variable"),
                (TokenType::NIL, "nil"),
                (TokenType::IDENTIFIER, "nil_"),
                (TokenType::PRINT, "print"),
                (TokenType::FOREACH, "foreach"),
                (TokenType::FOR, "for"),
                (TokenType::IDENTIFIER, "_x9"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_numbers() {
        assert_token_sequence(
            "3.14 42 7.",
            &[
                (TokenType::NUMBER, "3.14"),
                (TokenType::NUMBER, "42"),
                (TokenType::NUMBER, "7"),
                (TokenType::DOT, "."),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_string_keeps_quotes_and_counts_lines() {
        let tokens: Vec<Token> = Scanner::new("\"a\nb\" x").collect();

        assert_eq!(tokens[0].token_type, TokenType::STRING);
        assert_eq!(tokens[0].lexeme, "\"a\nb\"");
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].offset, 6);
    }

    #[test]
    fn test_scanner_06_comments_are_skipped() {
        let source = "1 // line comment\n/* block\ncomment */ 2";
        let tokens: Vec<Token> = Scanner::new(source).collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].lexeme, "1");
        assert_eq!(tokens[1].lexeme, "2");
        assert_eq!(tokens[1].line, 3);
        assert_eq!(tokens[2].token_type, TokenType::EOF);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let results: Vec<Token> = Scanner::new(source).collect();

        // 0: COMMA ','
        // 1: DOT '.'
        // 2: ERROR for '$'
        // 3: LEFT_PAREN '('
        // 4: ERROR for '#'
        // 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_eq!(results[0].token_type, TokenType::COMMA);
        assert_eq!(results[1].token_type, TokenType::DOT);
        assert_eq!(results[3].token_type, TokenType::LEFT_PAREN);
        assert_eq!(results[5].token_type, TokenType::EOF);

        let errors: Vec<&Token> = results
            .iter()
            .filter(|t| t.token_type == TokenType::ERROR)
            .collect();

        assert_eq!(errors.len(), 2, "Expected 2 error tokens");

        for err in errors {
            assert!(
                err.lexeme.contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                err.lexeme
            );
        }
    }

    #[test]
    fn test_non_ascii_is_one_error() {
        let tokens: Vec<Token> = Scanner::new("é+").collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].token_type, TokenType::ERROR);
        assert_eq!(tokens[1].token_type, TokenType::PLUS);
        assert_eq!(tokens[1].offset, 2);
    }

    #[test]
    fn test_single_ampersand_and_pipe_are_errors() {
        let kinds: Vec<TokenType> = Scanner::new("& |").map(|t| t.token_type).collect();

        assert_eq!(kinds, vec![TokenType::ERROR, TokenType::ERROR, TokenType::EOF]);
    }

    #[test]
    fn test_unterminated_string_and_comment() {
        let string: Vec<Token> = Scanner::new("\"abc").collect();
        assert_eq!(string[0].token_type, TokenType::ERROR);
        assert_eq!(string[0].lexeme, "Unterminated string.");
        assert_eq!(string[1].token_type, TokenType::EOF);

        let comment: Vec<Token> = Scanner::new("/* abc").collect();
        assert_eq!(comment[0].token_type, TokenType::ERROR);
        assert_eq!(comment[0].lexeme, "Unterminated comment.");
        assert_eq!(comment[1].token_type, TokenType::EOF);
    }

    #[test]
    fn test_token_source_keeps_returning_eof() {
        let mut scanner = Scanner::new("x");

        assert_eq!(scanner.next_token().token_type, TokenType::IDENTIFIER);

        for _ in 0..3 {
            assert_eq!(scanner.next_token().token_type, TokenType::EOF);
        }
    }

    #[test]
    fn test_iterator_is_fused_after_eof() {
        let mut scanner = Scanner::new("");

        assert_eq!(scanner.next().map(|t| t.token_type), Some(TokenType::EOF));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_token_display() {
        let tokens: Vec<Token> = Scanner::new("3 2.5 \"hi\" +").collect();
        let shown: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(shown[0], "NUMBER 3 3.0");
        assert_eq!(shown[1], "NUMBER 2.5 2.5");
        assert_eq!(shown[2], "STRING \"hi\" hi");
        assert_eq!(shown[3], "PLUS + null");
        assert_eq!(shown[4], "EOF  null");
    }
}
