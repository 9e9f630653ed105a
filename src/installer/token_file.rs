use std::{collections::HashSet, fmt, fs, io, path::Path};

#[derive(Debug)]
pub enum TokenFileError {
    Io(io::Error),
    NotUtf8,
    Csv(csv::Error),
    Empty,
    TooFewFields { line: u64, found: usize },
    EmptyField { line: u64, field: &'static str },
    DuplicateToken { line: u64 },
}

impl fmt::Display for TokenFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read token file: {}", e),
            Self::NotUtf8 => write!(f, "token file is not valid UTF-8"),
            Self::Csv(e) => write!(f, "token file is not valid CSV: {}", e),
            Self::Empty => write!(f, "token file has no entries"),
            Self::TooFewFields { line, found } => write!(
                f,
                "token file line {}: expected at least 3 fields (token,user,uid), found {}",
                line, found
            ),
            Self::EmptyField { line, field } => {
                write!(f, "token file line {}: {} is empty", line, field)
            }
            Self::DuplicateToken { line } => {
                write!(f, "token file line {}: token is already assigned", line)
            }
        }
    }
}

impl std::error::Error for TokenFileError {}

impl From<io::Error> for TokenFileError {
    fn from(error: io::Error) -> Self {
        TokenFileError::Io(error)
    }
}

impl From<csv::Error> for TokenFileError {
    fn from(error: csv::Error) -> Self {
        TokenFileError::Csv(error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEntry {
    pub token: String,
    pub username: String,
    pub uid: String,
    pub groups: Vec<String>,
}

/// Static token file (`token,user,uid,"group1,group2"`), kept verbatim for embedding.
#[derive(Debug, Clone)]
pub struct TokenAuthFile {
    pub raw: Vec<u8>,
    pub entries: Vec<TokenEntry>,
}

impl TokenAuthFile {
    pub fn load(path: &Path) -> Result<Self, TokenFileError> {
        Self::parse(fs::read(path)?)
    }

    pub fn parse(raw: Vec<u8>) -> Result<Self, TokenFileError> {
        if std::str::from_utf8(&raw).is_err() {
            return Err(TokenFileError::NotUtf8);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(raw.as_slice());

        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        for result in reader.records() {
            let record = result?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map_or(0, |pos| pos.line());

            if record.len() < 3 {
                return Err(TokenFileError::TooFewFields {
                    line,
                    found: record.len(),
                });
            }
            for (field, name) in record.iter().zip(["token", "user", "uid"]) {
                if field.is_empty() {
                    return Err(TokenFileError::EmptyField { line, field: name });
                }
            }
            if !seen.insert(record[0].to_string()) {
                return Err(TokenFileError::DuplicateToken { line });
            }

            let groups: Vec<String> = record
                .get(3)
                .map(|groups| {
                    groups
                        .split(',')
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            entries.push(TokenEntry {
                token: record[0].to_string(),
                username: record[1].to_string(),
                uid: record[2].to_string(),
                groups,
            });
        }

        if entries.is_empty() {
            return Err(TokenFileError::Empty);
        }
        Ok(Self { raw, entries })
    }
}
