//! Scripted edits given on the command line
//!
//! Page numbers and positions are 1-based, as users count them.

use std::str::FromStr;

use pagearrange_core::{CropRegion, EditorSession, PageArrangeError, PageId};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditParseError {
    #[error("expected {expected}, got {input:?}")]
    Malformed {
        expected: &'static str,
        input: String,
    },

    #[error("page numbers and positions start at 1, got {0:?}")]
    ZeroIndex(String),
}

/// `FROM:TO` display positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSpec {
    pub from: usize,
    pub to: usize,
}

/// `PAGE:DEGREES`, rotating the given original page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotateSpec {
    pub page: PageId,
    pub degrees: i32,
}

/// `PAGE:X,Y,WIDTH,HEIGHT` in rendered pixels
#[derive(Debug, Clone, PartialEq)]
pub struct CropSpec {
    pub page: PageId,
    pub region: [f64; 4],
}

fn split_pair<'a>(
    input: &'a str,
    expected: &'static str,
) -> Result<(&'a str, &'a str), EditParseError> {
    input
        .split_once(':')
        .map(|(a, b)| (a.trim(), b.trim()))
        .ok_or_else(|| malformed(input, expected))
}

fn malformed(input: &str, expected: &'static str) -> EditParseError {
    EditParseError::Malformed {
        expected,
        input: input.to_string(),
    }
}

/// Parse a 1-based number and return it 0-based
fn one_based(raw: &str, input: &str, expected: &'static str) -> Result<usize, EditParseError> {
    match raw.parse::<usize>() {
        Ok(0) => Err(EditParseError::ZeroIndex(input.to_string())),
        Ok(n) => Ok(n - 1),
        Err(_) => Err(malformed(input, expected)),
    }
}

fn page_id(raw: &str, input: &str, expected: &'static str) -> Result<PageId, EditParseError> {
    let index = one_based(raw, input, expected)?;
    u32::try_from(index)
        .map(PageId)
        .map_err(|_| malformed(input, expected))
}

impl FromStr for MoveSpec {
    type Err = EditParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const EXPECTED: &str = "FROM:TO";
        let (from, to) = split_pair(s, EXPECTED)?;
        Ok(Self {
            from: one_based(from, s, EXPECTED)?,
            to: one_based(to, s, EXPECTED)?,
        })
    }
}

impl FromStr for RotateSpec {
    type Err = EditParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const EXPECTED: &str = "PAGE:DEGREES";
        let (page, degrees) = split_pair(s, EXPECTED)?;
        Ok(Self {
            page: page_id(page, s, EXPECTED)?,
            degrees: degrees.parse().map_err(|_| malformed(s, EXPECTED))?,
        })
    }
}

impl FromStr for CropSpec {
    type Err = EditParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const EXPECTED: &str = "PAGE:X,Y,WIDTH,HEIGHT";
        let (page, rest) = split_pair(s, EXPECTED)?;
        let values = rest
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed(s, EXPECTED))?;
        let region: [f64; 4] = values.try_into().map_err(|_| malformed(s, EXPECTED))?;
        Ok(Self {
            page: page_id(page, s, EXPECTED)?,
            region,
        })
    }
}

/// Everything to apply between loading and exporting
#[derive(Debug, Default, Clone)]
pub struct EditScript {
    pub order: Option<Vec<PageId>>,
    pub moves: Vec<MoveSpec>,
    pub rotations: Vec<RotateSpec>,
    pub crops: Vec<CropSpec>,
}

impl EditScript {
    /// Apply the explicit order first, then moves, rotations and crops.
    pub fn apply(&self, session: &mut EditorSession) -> Result<(), PageArrangeError> {
        if let Some(order) = &self.order {
            session.reorder(order)?;
        }
        for m in &self.moves {
            session.move_page(m.from, Some(m.to))?;
        }
        for r in &self.rotations {
            session.select(r.page)?;
            let angle = session.rotate(r.degrees)?;
            info!("Page {} rotated to {:?}", r.page, angle.map(|a| a.degrees()));
        }
        for c in &self.crops {
            session.select(c.page)?;
            let [x, y, width, height] = c.region;
            session.crop(CropRegion::from_box(x, y, width, height)?)?;
            info!("Page {} cropped", c.page);
        }
        session.clear_selection();
        Ok(())
    }
}
