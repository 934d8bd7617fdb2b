use serde::{Deserialize, Serialize};

/// Display headers read from a PGN tag section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHeaders {
    pub event: Option<String>,
    pub site: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>, // "1-0", "0-1", "1/2-1/2", "*"
    pub eco: Option<String>,
    pub opening: Option<String>,
}

impl GameHeaders {
    /// Store a tag value if it is one of the display headers.
    /// Returns false for tags that are not kept.
    pub fn set(&mut self, name: &[u8], value: String) -> bool {
        let slot = match name {
            b"Event" => &mut self.event,
            b"Site" => &mut self.site,
            b"White" => &mut self.white,
            b"Black" => &mut self.black,
            b"Result" => &mut self.result,
            b"ECO" => &mut self.eco,
            b"Opening" => &mut self.opening,
            _ => return false,
        };
        // "?" is the PGN placeholder for an unknown value
        *slot = if value.is_empty() || value == "?" { None } else { Some(value) };
        true
    }
}
