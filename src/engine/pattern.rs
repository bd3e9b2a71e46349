//! Template compilation.
//! Parses a destination template like `{CREATED_YYYY}/{CREATED_MM}{CREATED_DD}/{FILE_NAME}`
//! into an ordered list of literal and placeholder segments, rejecting
//! malformed or unrecognized input before any filesystem work starts.

use crate::errors::PatternError;

/// A named substitution point, resolved from file metadata at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    FileName,
    FileStem,
    FileExt,
    CreatedYear,
    CreatedMonth,
    CreatedDay,
    ModifiedYear,
    ModifiedMonth,
    ModifiedDay,
}

impl Token {
    /// Case-insensitive token lookup.
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "FILE_NAME" => Some(Self::FileName),
            "FILE_STEM" => Some(Self::FileStem),
            "FILE_EXT" => Some(Self::FileExt),
            "CREATED_YYYY" => Some(Self::CreatedYear),
            "CREATED_MM" => Some(Self::CreatedMonth),
            "CREATED_DD" => Some(Self::CreatedDay),
            "MODIFIED_YYYY" => Some(Self::ModifiedYear),
            "MODIFIED_MM" => Some(Self::ModifiedMonth),
            "MODIFIED_DD" => Some(Self::ModifiedDay),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Token),
}

/// The parsed, validated, substitution-ready form of a template string.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    segments: Vec<Segment>,
}

impl CompiledPattern {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Compile a template string.
///
/// Errors on an empty template, an unterminated `{`, an unrecognized
/// placeholder name, and any literal that would contribute a `..` path
/// component (which could escape the target root regardless of metadata).
/// A bare `}` outside a placeholder is inert literal text.
pub fn compile(template: &str) -> Result<CompiledPattern, PatternError> {
    if template.is_empty() {
        return Err(PatternError::Empty);
    }

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;
    let mut offset = 0usize;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let close = after_open
            .find('}')
            .ok_or(PatternError::Unterminated(offset + open))?;
        let name = &after_open[..close];
        let token = Token::parse(name).ok_or_else(|| PatternError::UnknownToken(name.to_string()))?;

        flush_literal(&mut segments, &mut literal)?;
        segments.push(Segment::Placeholder(token));

        offset += open + 1 + close + 1;
        rest = &after_open[close + 1..];
    }
    literal.push_str(rest);
    flush_literal(&mut segments, &mut literal)?;

    Ok(CompiledPattern { segments })
}

fn flush_literal(segments: &mut Vec<Segment>, literal: &mut String) -> Result<(), PatternError> {
    if literal.is_empty() {
        return Ok(());
    }
    // Any `..` component inside a literal is a compile-time error; render-time
    // checks in the resolver would catch it too, but failing here points at
    // the template rather than at an arbitrary file.
    if literal.split(['/', '\\']).any(|part| part == "..") {
        return Err(PatternError::ParentTraversal(std::mem::take(literal)));
    }
    segments.push(Segment::Literal(std::mem::take(literal)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_default_pattern() {
        let compiled = compile("{CREATED_YYYY}/{CREATED_MM}{CREATED_DD}/{FILE_NAME}").unwrap();
        assert_eq!(
            compiled.segments(),
            &[
                Segment::Placeholder(Token::CreatedYear),
                Segment::Literal("/".into()),
                Segment::Placeholder(Token::CreatedMonth),
                Segment::Placeholder(Token::CreatedDay),
                Segment::Literal("/".into()),
                Segment::Placeholder(Token::FileName),
            ]
        );
    }

    #[test]
    fn tokens_match_case_insensitively() {
        let compiled = compile("{file_name}").unwrap();
        assert_eq!(compiled.segments(), &[Segment::Placeholder(Token::FileName)]);
    }

    #[test]
    fn literal_only_template_is_one_segment() {
        let compiled = compile("archive/inbox").unwrap();
        assert_eq!(
            compiled.segments(),
            &[Segment::Literal("archive/inbox".into())]
        );
    }

    #[test]
    fn empty_template_is_rejected() {
        assert_eq!(compile(""), Err(PatternError::Empty));
    }

    #[test]
    fn unterminated_placeholder_is_rejected() {
        assert_eq!(compile("a/{FILE_NAME"), Err(PatternError::Unterminated(2)));
    }

    #[test]
    fn unknown_token_is_rejected() {
        assert_eq!(
            compile("{NOPE}"),
            Err(PatternError::UnknownToken("NOPE".into()))
        );
    }

    #[test]
    fn parent_traversal_literal_is_rejected() {
        assert!(matches!(
            compile("../{FILE_NAME}"),
            Err(PatternError::ParentTraversal(_))
        ));
        assert!(matches!(
            compile("a/..\\b/{FILE_NAME}"),
            Err(PatternError::ParentTraversal(_))
        ));
    }

    #[test]
    fn dots_inside_names_are_fine() {
        assert!(compile("archive.2023/{FILE_NAME}").is_ok());
        assert!(compile("...three-dots/{FILE_NAME}").is_ok());
    }

    #[test]
    fn stray_closing_brace_is_literal() {
        let compiled = compile("a}b").unwrap();
        assert_eq!(compiled.segments(), &[Segment::Literal("a}b".into())]);
    }
}
