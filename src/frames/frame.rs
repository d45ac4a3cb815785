use crate::error::FrameError;

/// Kind assigned to frames that carry no `event:` field.
pub const DEFAULT_KIND: &str = "message";

/// One dispatched event-stream frame, before payload decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Last event id in effect when the frame was dispatched (the cursor).
    pub id: Option<String>,
    /// Value of the `event:` field, if any.
    pub event: Option<String>,
    /// Joined `data:` lines, without the trailing newline.
    pub data: String,
}

impl Frame {
    /// Creates a frame with the given kind and data and no cursor.
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: None,
            event: Some(event.into()),
            data: data.into(),
        }
    }

    /// Attaches a cursor.
    #[inline]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the frame kind, falling back to [`DEFAULT_KIND`].
    ///
    /// An empty `event:` value counts as missing.
    pub fn kind(&self) -> &str {
        match self.event.as_deref() {
            Some(kind) if !kind.is_empty() => kind,
            _ => DEFAULT_KIND,
        }
    }

    /// Decodes the `data` field as JSON.
    pub fn payload(&self) -> Result<serde_json::Value, FrameError> {
        serde_json::from_str(&self.data).map_err(|e| FrameError::Payload {
            reason: e.to_string(),
        })
    }
}
