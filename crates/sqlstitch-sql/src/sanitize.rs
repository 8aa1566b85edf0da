//! Query text cleanup before parsing

use sqlparser::dialect::Dialect;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer, TokenizerError, Whitespace};

/// Strip comments and a trailing semicolon from query text
///
/// The text is tokenized with the query's own dialect, so quoting and
/// escaping rules (backslash escapes, dollar quoting, nested block comments)
/// decide what is a comment. Every comment becomes a single space and all
/// other text is copied through exactly as written.
pub fn sanitize(dialect: &dyn Dialect, sql: &str) -> Result<String, TokenizerError> {
    let tokens = Tokenizer::new(dialect, sql).tokenize_with_location()?;
    let mut pieces = source_pieces(sql, tokens);

    if let Some(last) = pieces.iter().rposition(|(token, _)| !matches!(token, Token::Whitespace(_))) {
        if pieces[last].0 == Token::SemiColon {
            pieces.remove(last);
        }
    }

    let out: String = pieces.into_iter().map(|(_, text)| text).collect();
    Ok(out.trim().to_string())
}

/// Pair every non-comment token with its source text
///
/// Token spans tile the input end to end, so each token's text is the run
/// of characters up to its end location.
fn source_pieces(sql: &str, tokens: Vec<TokenWithSpan>) -> Vec<(Token, String)> {
    let mut chars = sql.chars();
    let (mut line, mut column) = (1, 1);
    let mut pieces = Vec::with_capacity(tokens.len());

    for TokenWithSpan { token, span } in tokens {
        let mut text = String::new();
        while (line, column) < (span.end.line, span.end.column) {
            let Some(c) = chars.next() else { break };
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            text.push(c);
        }

        match token {
            Token::Whitespace(Whitespace::SingleLineComment { .. } | Whitespace::MultiLineComment(_)) => {
                pieces.push((Token::Whitespace(Whitespace::Space), " ".to_string()));
            }
            token => pieces.push((token, text)),
        }
    }

    pieces
}

/// Swap the operator escapes used in resolver-supplied text
///
/// `<>` becomes `!=` and then `@@` becomes `<>`, so callers can write `@@`
/// when they need a literal `<>` to survive.
pub fn escape_operators(text: &str) -> String {
    text.replace("<>", "!=").replace("@@", "<>")
}
