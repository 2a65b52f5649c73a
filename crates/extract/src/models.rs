use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// The role a work has to its composer, as encoded by the catalog's category
/// tabs (`p1` through `p12`).
///
/// This table is deliberately closed: the catalog enumerates exactly these
/// kinds, and an unrecognized code means the catalog schema has changed under
/// us. Parsing an unknown code is a hard [`UnknownRelationKind`](ErrorKind::UnknownRelationKind)
/// error, never a silent drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Compositions,
    Collaborations,
    Pasticcios,
    AsArranger,
    AsCopyist,
    AsDedicatee,
    AsEditor,
    AsLibrettist,
    AsTranslator,
    AsPerformer,
    Books,
    Collections,
}

impl RelationKind {
    /// Returns the display name used by the catalog's tab labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Compositions => "Compositions",
            RelationKind::Collaborations => "Collaborations",
            RelationKind::Pasticcios => "Pasticcios",
            RelationKind::AsArranger => "As Arranger",
            RelationKind::AsCopyist => "As Copyist",
            RelationKind::AsDedicatee => "As Dedicatee",
            RelationKind::AsEditor => "As Editor",
            RelationKind::AsLibrettist => "As Librettist",
            RelationKind::AsTranslator => "As Translator",
            RelationKind::AsPerformer => "As Performer",
            RelationKind::Books => "Books",
            RelationKind::Collections => "Collections",
        }
    }

    /// Returns the payload key code (`p1`..`p12`) for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            RelationKind::Compositions => "p1",
            RelationKind::Collaborations => "p2",
            RelationKind::Pasticcios => "p3",
            RelationKind::AsArranger => "p4",
            RelationKind::AsCopyist => "p5",
            RelationKind::AsDedicatee => "p6",
            RelationKind::AsEditor => "p7",
            RelationKind::AsLibrettist => "p8",
            RelationKind::AsTranslator => "p9",
            RelationKind::AsPerformer => "p10",
            RelationKind::Books => "p11",
            RelationKind::Collections => "p12",
        }
    }

    /// Looks up a payload key code in the fixed table.
    pub fn from_code(code: &str) -> Result<Self, Error> {
        Ok(match code {
            "p1" => RelationKind::Compositions,
            "p2" => RelationKind::Collaborations,
            "p3" => RelationKind::Pasticcios,
            "p4" => RelationKind::AsArranger,
            "p5" => RelationKind::AsCopyist,
            "p6" => RelationKind::AsDedicatee,
            "p7" => RelationKind::AsEditor,
            "p8" => RelationKind::AsLibrettist,
            "p9" => RelationKind::AsTranslator,
            "p10" => RelationKind::AsPerformer,
            "p11" => RelationKind::Books,
            "p12" => RelationKind::Collections,
            _ => exn::bail!(ErrorKind::UnknownRelationKind(code.to_string())),
        })
    }
}

impl FromStr for RelationKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
