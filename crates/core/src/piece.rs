//! Piece — the unit of candidate content.
//!
//! A piece describes one fragment competing for budget: its content, its
//! priority under pressure, its output position, and how it degrades when
//! it does not fit (fallbacks, truncation, or failure).
//!
//! Pieces are immutable inputs to the renderer. The pipeline never mutates
//! a caller's piece; fallback and truncation substitution produce fresh
//! copies with overridden content and cost.

use crate::condition::Condition;
use crate::error::ValidationError;
use crate::priority::Priority;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The conversational role a piece renders under.
///
/// A pass-through tag: the pipeline carries it into the output message
/// list without interpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (identity, rules)
    System,
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        };
        f.write_str(name)
    }
}

/// What a piece's content represents.
///
/// Only `ToolDefinition` carries special handling: its opaque metadata
/// payload is surfaced separately in the render result's tool list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Text,
    Image,
    #[serde(rename = "tool-definition")]
    ToolDefinition,
    File,
}

impl FromStr for ContentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "tool-definition" => Ok(Self::ToolDefinition),
            "file" => Ok(Self::File),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// Behavior when neither the primary content nor any fallback fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Fatal render error (silent drop for empty-content reservations).
    #[default]
    Fail,
    /// Keep a prefix that fits.
    TruncateEnd,
    /// Keep a prefix and a suffix joined by a separator marker.
    TruncateMiddle,
}

impl OverflowPolicy {
    /// Whether this policy lets content shrink instead of failing.
    pub fn truncates(self) -> bool {
        matches!(self, Self::TruncateEnd | Self::TruncateMiddle)
    }
}

impl FromStr for OverflowPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "truncate-end" => Ok(Self::TruncateEnd),
            "truncate-middle" => Ok(Self::TruncateMiddle),
            other => Err(ValidationError::UnknownPolicy(other.to_string())),
        }
    }
}

/// One candidate unit of content with priority, ordering, and degradation
/// rules. Construct via [`Piece::text`] for plain content or
/// [`Piece::builder`] for full control with validation.
#[derive(Debug, Clone)]
pub struct Piece {
    /// Output role tag, not interpreted by the pipeline.
    pub role: Role,

    /// The primary content. Empty content marks a *reservation*: budget is
    /// consumed but no output message is produced.
    pub content: String,

    /// Importance under budget pressure. Higher survives.
    pub priority: Priority,

    /// Output ordering key, independent of priority. Not necessarily
    /// contiguous; ties are broken by stable input order.
    pub sequence: i64,

    /// Caller-supplied cost, used verbatim. `None` means "measure the
    /// content with the size oracle at render time".
    pub cost: Option<usize>,

    /// Alternative contents tried in order when the primary does not fit.
    pub fallbacks: Vec<String>,

    /// Name of the sub-budget this piece competes in, if any.
    pub section: Option<String>,

    /// Cache-breakpoint hint. No effect on inclusion.
    pub cacheable: bool,

    /// What the content represents.
    pub kind: ContentKind,

    /// Render-time inclusion predicate.
    pub condition: Option<Condition>,

    /// Behavior when nothing fits.
    pub overflow: OverflowPolicy,

    /// Opaque payload, surfaced verbatim for tool-definition pieces.
    pub metadata: Option<serde_json::Value>,
}

impl Piece {
    /// A plain text piece with default priority, sequence 0, and fail-fast
    /// overflow. Always valid.
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            priority: Priority::default(),
            sequence: 0,
            cost: None,
            fallbacks: Vec::new(),
            section: None,
            cacheable: false,
            kind: ContentKind::Text,
            condition: None,
            overflow: OverflowPolicy::default(),
            metadata: None,
        }
    }

    /// Start building a piece with validation at `build()` time.
    pub fn builder(role: Role, content: impl Into<String>) -> PieceBuilder {
        PieceBuilder {
            piece: Self::text(role, content),
            sequence: None,
        }
    }

    /// Whether this piece is a reservation: budget consumed, no message.
    pub fn is_reservation(&self) -> bool {
        self.content.is_empty()
    }
}

/// Validating builder for [`Piece`].
#[derive(Debug, Clone)]
pub struct PieceBuilder {
    piece: Piece,
    sequence: Option<i64>,
}

impl PieceBuilder {
    pub fn priority(mut self, priority: impl Into<Priority>) -> Self {
        self.piece.priority = priority.into();
        self
    }

    /// Mark the piece always-keep.
    pub fn always(mut self) -> Self {
        self.piece.priority = Priority::Always;
        self
    }

    pub fn sequence(mut self, sequence: i64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Set the sequence only if none was set explicitly. Used by
    /// accumulating builders that hand out sequence numbers.
    pub fn sequence_default(mut self, sequence: i64) -> Self {
        self.sequence.get_or_insert(sequence);
        self
    }

    /// Supply a precomputed cost, skipping oracle measurement.
    pub fn cost(mut self, cost: usize) -> Self {
        self.piece.cost = Some(cost);
        self
    }

    /// Append a fallback, tried after the primary and earlier fallbacks.
    pub fn fallback(mut self, content: impl Into<String>) -> Self {
        self.piece.fallbacks.push(content.into());
        self
    }

    pub fn section(mut self, name: impl Into<String>) -> Self {
        self.piece.section = Some(name.into());
        self
    }

    pub fn cacheable(mut self, cacheable: bool) -> Self {
        self.piece.cacheable = cacheable;
        self
    }

    pub fn kind(mut self, kind: ContentKind) -> Self {
        self.piece.kind = kind;
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.piece.condition = Some(condition);
        self
    }

    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.piece.overflow = policy;
        self
    }

    pub fn metadata(mut self, payload: serde_json::Value) -> Self {
        self.piece.metadata = Some(payload);
        self
    }

    /// Validate and produce the piece.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingToolPayload`] — a tool-definition piece
    ///   without a metadata payload has nothing to surface.
    /// - [`ValidationError::UnmeasurableCost`] — a tool-definition piece
    ///   with empty content and no explicit cost cannot be priced.
    /// - [`ValidationError::RedundantFallback`] — a fallback identical to
    ///   the primary can never help; it signals a caller bug.
    pub fn build(self) -> Result<Piece, ValidationError> {
        let mut piece = self.piece;
        piece.sequence = self.sequence.unwrap_or(0);

        if piece.kind == ContentKind::ToolDefinition {
            if piece.metadata.is_none() {
                return Err(ValidationError::MissingToolPayload);
            }
            if piece.content.is_empty() && piece.cost.is_none() {
                return Err(ValidationError::UnmeasurableCost);
            }
        }

        if let Some(index) = piece.fallbacks.iter().position(|f| *f == piece.content) {
            return Err(ValidationError::RedundantFallback { index });
        }

        Ok(piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_piece_defaults() {
        let piece = Piece::text(Role::System, "You are helpful.");
        assert_eq!(piece.priority, Priority::Finite(0));
        assert_eq!(piece.sequence, 0);
        assert_eq!(piece.overflow, OverflowPolicy::Fail);
        assert!(piece.cost.is_none());
        assert!(!piece.is_reservation());
    }

    #[test]
    fn empty_content_is_a_reservation() {
        let piece = Piece::text(Role::User, "");
        assert!(piece.is_reservation());
    }

    #[test]
    fn builder_sets_all_fields() {
        let piece = Piece::builder(Role::Assistant, "hi")
            .priority(7)
            .sequence(30)
            .cost(12)
            .fallback("h")
            .section("history")
            .cacheable(true)
            .overflow(OverflowPolicy::TruncateEnd)
            .build()
            .unwrap();

        assert_eq!(piece.priority, Priority::Finite(7));
        assert_eq!(piece.sequence, 30);
        assert_eq!(piece.cost, Some(12));
        assert_eq!(piece.fallbacks, vec!["h".to_string()]);
        assert_eq!(piece.section.as_deref(), Some("history"));
        assert!(piece.cacheable);
        assert_eq!(piece.overflow, OverflowPolicy::TruncateEnd);
    }

    #[test]
    fn sequence_default_respects_explicit_value() {
        let explicit = Piece::builder(Role::User, "a")
            .sequence(5)
            .sequence_default(99)
            .build()
            .unwrap();
        assert_eq!(explicit.sequence, 5);

        let defaulted = Piece::builder(Role::User, "a")
            .sequence_default(99)
            .build()
            .unwrap();
        assert_eq!(defaulted.sequence, 99);
    }

    #[test]
    fn tool_definition_requires_payload() {
        let err = Piece::builder(Role::System, "search tool")
            .kind(ContentKind::ToolDefinition)
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingToolPayload));
    }

    #[test]
    fn empty_tool_definition_requires_cost() {
        let err = Piece::builder(Role::System, "")
            .kind(ContentKind::ToolDefinition)
            .metadata(serde_json::json!({"name": "search"}))
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnmeasurableCost));

        let ok = Piece::builder(Role::System, "")
            .kind(ContentKind::ToolDefinition)
            .metadata(serde_json::json!({"name": "search"}))
            .cost(20)
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn duplicate_fallback_rejected() {
        let err = Piece::builder(Role::User, "same")
            .fallback("shorter")
            .fallback("same")
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::RedundantFallback { index: 1 }));
    }

    #[test]
    fn role_parsing() {
        assert_eq!("system".parse::<Role>().unwrap(), Role::System);
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert!(matches!(
            "developer".parse::<Role>(),
            Err(ValidationError::UnknownRole(_))
        ));
    }

    #[test]
    fn kind_parsing() {
        assert_eq!(
            "tool-definition".parse::<ContentKind>().unwrap(),
            ContentKind::ToolDefinition
        );
        assert!(matches!(
            "video".parse::<ContentKind>(),
            Err(ValidationError::UnknownKind(_))
        ));
    }

    #[test]
    fn policy_parsing() {
        assert_eq!(
            "truncate-middle".parse::<OverflowPolicy>().unwrap(),
            OverflowPolicy::TruncateMiddle
        );
        assert!(matches!(
            "wrap".parse::<OverflowPolicy>(),
            Err(ValidationError::UnknownPolicy(_))
        ));
    }
}
