pub const TABLE_NODE: &str = "node";
pub const TABLE_EDGE: &str = "edge";

pub const FIELD_NAME: &str = "name";
pub const FIELD_LABELS: &str = "labels";
pub const FIELD_CODE: &str = "code";
pub const FIELD_FILE_PATH: &str = "filePath";
pub const FIELD_EMBEDDING: &str = "embedding";

pub const LABEL_CLASS: &str = "Class";
pub const LABEL_RECORD: &str = "Record";
pub const LABEL_INTERFACE: &str = "Interface";
pub const LABEL_TYPE: &str = "Type";
pub const LABEL_METHOD: &str = "Method";
pub const LABEL_ATTRIBUTE: &str = "Attribute";
pub const LABEL_VARIABLE: &str = "Variable";
pub const LABEL_CONDITION: &str = "Condition";
pub const LABEL_EXCEPTION: &str = "Exception";
pub const LABEL_DIAGNOSTIC: &str = "Diagnostic";

pub const REL_CALLS: &str = "CALLS";
pub const REL_INHERITS: &str = "INHERITS";
pub const REL_IMPLEMENTS: &str = "IMPLEMENTS";
pub const REL_DEPENDS_ON: &str = "DEPENDS_ON";
pub const REL_HAS_ATTRIBUTE: &str = "HAS_ATTRIBUTE";
pub const REL_READS_VARIABLE: &str = "READS_VARIABLE";
pub const REL_HAS_CONDITION: &str = "HAS_CONDITION";
pub const REL_CATCHES: &str = "CATCHES";
pub const REL_RETURNS: &str = "RETURNS";
pub const REL_HAS_PARAMETER: &str = "HAS_PARAMETER";
pub const REL_HAS_ISSUE: &str = "HAS_ISSUE";

/// Node labels written by the indexer.
pub const NODE_LABELS: &[&str] = &[
    LABEL_CLASS,
    LABEL_RECORD,
    LABEL_INTERFACE,
    LABEL_TYPE,
    LABEL_METHOD,
    LABEL_ATTRIBUTE,
    LABEL_VARIABLE,
    LABEL_CONDITION,
    LABEL_EXCEPTION,
    LABEL_DIAGNOSTIC,
];

/// Edge kinds written by the indexer.
pub const RELATIONSHIP_TYPES: &[&str] = &[
    REL_CALLS,
    REL_INHERITS,
    REL_IMPLEMENTS,
    REL_DEPENDS_ON,
    REL_HAS_ATTRIBUTE,
    REL_READS_VARIABLE,
    REL_HAS_CONDITION,
    REL_CATCHES,
    REL_RETURNS,
    REL_HAS_PARAMETER,
    REL_HAS_ISSUE,
];

/// Embedding width of the vectors stored on indexed nodes.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
