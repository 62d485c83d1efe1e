use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: Subtitle loading, saving and in-memory representation

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("valid SRT timestamp regex")
});

// @const: SSA timestamp regex (H:MM:SS.cc)
static SSA_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})\.(\d{2})$").expect("valid SSA timestamp regex")
});

// @const: SSA line break markers inside dialogue text
static SSA_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[Nn]").expect("valid SSA break regex"));

/// Event fields assumed when an `[Events]` section has no `Format:` line
const DEFAULT_SSA_FIELDS: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

/// On-disk subtitle format; a file is always saved in the format it was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// SubRip (`.srt`)
    Srt,
    /// SubStation Alpha / Advanced SubStation Alpha (`.ssa`, `.ass`)
    Ssa,
}

impl SubtitleFormat {
    /// Detect the format from the file extension, falling back to the content
    pub fn detect(path: &Path, content: &str) -> Option<Self> {
        let by_extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "srt" => Some(Self::Srt),
                "ssa" | "ass" => Some(Self::Ssa),
                _ => None,
            });

        if by_extension.is_some() {
            return by_extension;
        }

        if content.contains("[Script Info]") || content.lines().any(|l| l.trim_start().starts_with("Dialogue:")) {
            Some(Self::Ssa)
        } else if TIMESTAMP_REGEX.is_match(content) {
            Some(Self::Srt)
        } else {
            None
        }
    }

    /// Lowercase name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ssa => "ssa",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hard line break token written when an event has none of its own
const SSA_HARD_BREAK: &str = "\\N";

/// Raw `Dialogue:` field values of an SSA event, in `Format:` order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsaEvent {
    pub fields: Vec<String>,
    /// Break token used in the source text (`\N` or `\n`)
    pub line_break: String,
    /// Non-dialogue lines (such as `Comment:`) between the previous dialogue line and this one
    pub preceding: Vec<String>,
}

/// Layout of an SSA file needed to write it back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsaLayout {
    /// Everything before the first `Dialogue:` line, verbatim
    pub header: String,
    /// Lines after the last `Dialogue:` line, verbatim
    pub trailer: Vec<String>,
    /// Event field names from the `Format:` line
    pub field_names: Vec<String>,
}

impl SsaLayout {
    fn field_index(&self, name: &str) -> Option<usize> {
        self.field_names.iter().position(|f| f.eq_ignore_ascii_case(name))
    }
}

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: One string per physical subtitle line
    pub lines: Vec<String>,

    // @field: Original SSA event fields, if loaded from an SSA file
    pub ssa_event: Option<SsaEvent>,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry, splitting `text` into physical lines
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: impl AsRef<str>) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines: text.as_ref().lines().map(str::to_string).collect(),
            ssa_event: None,
        }
    }

    // @creates: Validated subtitle entry
    // @validates: Time range and non-empty text
    pub fn new_validated(seq_num: usize, start_time_ms: u64, end_time_ms: u64, lines: Vec<String>) -> Result<Self, String> {
        if end_time_ms < start_time_ms {
            return Err(format!(
                "Invalid time range: end time {} < start time {}",
                end_time_ms, start_time_ms
            ));
        }

        let lines: Vec<String> = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(format!("Empty subtitle text for entry {}", seq_num));
        }

        Ok(SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines,
            ssa_event: None,
        })
    }

    /// Copy of this entry with its text replaced; timing and event fields are kept
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        SubtitleEntry {
            lines,
            ..self.clone()
        }
    }

    /// Text with physical lines joined by newlines
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Text flattened to a single line, as sent to the model
    pub fn single_line_text(&self) -> String {
        self.lines.join(" ")
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Parse an SSA timestamp (H:MM:SS.cc) to milliseconds
    pub fn parse_ssa_timestamp(timestamp: &str) -> Option<u64> {
        let caps = SSA_TIME_REGEX.captures(timestamp.trim())?;
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
        Some(num(1)? * 3_600_000 + num(2)? * 60_000 + num(3)? * 1_000 + num(4)? * 10)
    }

    /// Format milliseconds as an SSA timestamp (H:MM:SS.cc)
    pub fn format_ssa_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let centis = (ms % 1_000) / 10;

        format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// Collection of subtitle entries with the metadata needed to save them again
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// File the collection was loaded from, or will be saved to
    pub source_file: PathBuf,

    /// Format the collection was loaded as
    pub format: SubtitleFormat,

    /// List of subtitle entries, ascending by sequence number
    pub entries: Vec<SubtitleEntry>,

    /// SSA header and field layout; `None` for SRT
    pub ssa_layout: Option<SsaLayout>,
}

impl SubtitleCollection {
    /// Create an empty SRT collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            format: SubtitleFormat::Srt,
            entries: Vec::new(),
            ssa_layout: None,
        }
    }

    /// Empty collection with the same format and layout, ready to be filled
    pub fn empty_like(&self, target_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file: target_file,
            format: self.format,
            entries: Vec::with_capacity(self.entries.len()),
            ssa_layout: self.ssa_layout.clone(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a subtitle file, detecting its format
    ///
    /// A file that parses to zero entries loads successfully; callers decide
    /// whether an empty collection is acceptable.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SubtitleError::NotFound(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path).map_err(|source| SubtitleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = raw.trim_start_matches('\u{feff}');

        let format = SubtitleFormat::detect(path, content)
            .ok_or_else(|| SubtitleError::UnknownFormat(path.to_path_buf()))?;

        let mut collection = match format {
            SubtitleFormat::Srt => {
                let mut collection = Self::new(path.to_path_buf());
                collection.entries = Self::parse_srt_string(content)?;
                collection
            }
            SubtitleFormat::Ssa => Self::parse_ssa_string(content)?,
        };
        collection.source_file = path.to_path_buf();

        debug!("Loaded {} {} entries from {:?}", collection.entries.len(), format, path);
        Ok(collection)
    }

    /// Save the collection in the format it was loaded as
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();
        let io_err = |source| SubtitleError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = match self.format {
            SubtitleFormat::Srt => self.to_srt_string(),
            SubtitleFormat::Ssa => self.to_ssa_string(),
        };

        fs::write(path, content).map_err(io_err)
    }

    /// Render the collection as SRT
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|e| e.to_string()).collect()
    }

    /// Render the collection as SSA, reusing the loaded header and field layout
    pub fn to_ssa_string(&self) -> String {
        let layout = self.ssa_layout.clone().unwrap_or_else(Self::default_ssa_layout);
        let start_idx = layout.field_index("Start");
        let end_idx = layout.field_index("End");
        let text_idx = layout.field_index("Text").unwrap_or(layout.field_names.len().saturating_sub(1));

        let mut out = layout.header.clone();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }

        for entry in &self.entries {
            let (mut fields, line_break) = match &entry.ssa_event {
                Some(event) => {
                    for line in &event.preceding {
                        out.push_str(line);
                        out.push('\n');
                    }
                    (event.fields.clone(), event.line_break.as_str())
                }
                None => (Self::default_event_fields(layout.field_names.len()), SSA_HARD_BREAK),
            };
            if fields.len() < layout.field_names.len() {
                fields.resize(layout.field_names.len(), String::new());
            }
            if let Some(i) = start_idx {
                fields[i] = SubtitleEntry::format_ssa_timestamp(entry.start_time_ms);
            }
            if let Some(i) = end_idx {
                fields[i] = SubtitleEntry::format_ssa_timestamp(entry.end_time_ms);
            }
            fields[text_idx] = entry.lines.join(line_break);

            out.push_str("Dialogue: ");
            out.push_str(&fields.join(","));
            out.push('\n');
        }

        for line in &layout.trailer {
            out.push_str(line);
            out.push('\n');
        }

        out
    }

    fn default_ssa_layout() -> SsaLayout {
        let field_names: Vec<String> = DEFAULT_SSA_FIELDS.iter().map(|s| s.to_string()).collect();
        SsaLayout {
            header: format!(
                "[Script Info]\nScriptType: v4.00+\n\n[Events]\nFormat: {}\n",
                field_names.join(", ")
            ),
            trailer: Vec::new(),
            field_names,
        }
    }

    fn default_event_fields(count: usize) -> Vec<String> {
        DEFAULT_SSA_FIELDS
            .iter()
            .map(|name| match *name {
                "Layer" => "0".to_string(),
                "Style" => "Default".to_string(),
                "MarginL" | "MarginR" | "MarginV" => "0".to_string(),
                _ => String::new(),
            })
            .chain(std::iter::repeat(String::new()))
            .take(count)
            .collect()
    }

    /// Parse SRT format string into subtitle entries
    ///
    /// An entry starts at a sequence number directly followed by a timing line,
    /// so a caption without text never swallows the next one.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        let mut entries = Vec::new();
        let lines: Vec<&str> = content.lines().map(str::trim).collect();

        // State variables for parsing
        let mut current: Option<(usize, (u64, u64))> = None;
        let mut current_lines: Vec<String> = Vec::new();

        let mut line_idx = 0;
        while line_idx < lines.len() {
            let trimmed = lines[line_idx];

            if let Ok(num) = trimmed.parse::<usize>() {
                if let Some(caps) = lines.get(line_idx + 1).and_then(|next| TIMESTAMP_REGEX.captures(next)) {
                    let times = (Self::captures_to_ms(&caps, 1)?, Self::captures_to_ms(&caps, 5)?);
                    Self::finish_srt_entry(&mut entries, current.take(), &mut current_lines);
                    current = Some((num, times));
                    line_idx += 2;
                    continue;
                }
            }

            if trimmed.is_empty() {
                Self::finish_srt_entry(&mut entries, current.take(), &mut current_lines);
            } else if current.is_some() {
                current_lines.push(trimmed.to_string());
            } else {
                warn!(
                    "Unexpected text at line {} before sequence number or timestamp: {}",
                    line_idx + 1,
                    trimmed
                );
            }
            line_idx += 1;
        }

        Self::finish_srt_entry(&mut entries, current, &mut current_lines);

        entries.sort_by_key(|entry| entry.seq_num);
        Ok(entries)
    }

    // @validates: Pending SRT entry; invalid or textless entries are dropped with a warning
    fn finish_srt_entry(
        entries: &mut Vec<SubtitleEntry>,
        header: Option<(usize, (u64, u64))>,
        lines: &mut Vec<String>,
    ) {
        let lines = std::mem::take(lines);
        let Some((seq_num, (start_ms, end_ms))) = header else {
            return;
        };
        match SubtitleEntry::new_validated(seq_num, start_ms, end_ms, lines) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Skipping invalid subtitle entry {}: {}", seq_num, e),
        }
    }

    /// Parse an SSA/ASS script into a collection
    pub fn parse_ssa_string(content: &str) -> Result<Self, SubtitleError> {
        let mut header = String::new();
        let mut pending = Vec::new();
        let mut field_names: Option<Vec<String>> = None;
        let mut in_events = false;
        let mut seen_dialogue = false;
        let mut entries = Vec::new();

        for (line_idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                in_events = trimmed.eq_ignore_ascii_case("[events]");
            }

            if in_events {
                if let Some(rest) = trimmed.strip_prefix("Format:") {
                    field_names = Some(rest.split(',').map(|f| f.trim().to_string()).collect());
                } else if let Some(rest) = trimmed.strip_prefix("Dialogue:") {
                    seen_dialogue = true;
                    let names = field_names
                        .get_or_insert_with(|| DEFAULT_SSA_FIELDS.iter().map(|s| s.to_string()).collect());
                    let mut entry = Self::parse_ssa_dialogue(rest, names, entries.len() + 1, line_idx + 1)?;
                    if let Some(event) = entry.ssa_event.as_mut() {
                        event.preceding = std::mem::take(&mut pending);
                    }
                    entries.push(entry);
                    continue;
                }
            }

            if seen_dialogue {
                pending.push(line.to_string());
            } else {
                header.push_str(line);
                header.push('\n');
            }
        }

        let field_names = field_names.unwrap_or_else(|| DEFAULT_SSA_FIELDS.iter().map(|s| s.to_string()).collect());

        Ok(SubtitleCollection {
            source_file: PathBuf::new(),
            format: SubtitleFormat::Ssa,
            entries,
            ssa_layout: Some(SsaLayout {
                header,
                trailer: pending,
                field_names,
            }),
        })
    }

    fn parse_ssa_dialogue(
        rest: &str,
        field_names: &[String],
        seq_num: usize,
        line_number: usize,
    ) -> Result<SubtitleEntry, SubtitleError> {
        let fields: Vec<String> = rest
            .trim_start()
            .splitn(field_names.len(), ',')
            .map(str::to_string)
            .collect();

        let find = |name: &str| field_names.iter().position(|f| f.eq_ignore_ascii_case(name));
        let malformed = |message: String| SubtitleError::Malformed {
            line: line_number,
            message,
        };

        let (Some(start_idx), Some(end_idx), Some(text_idx)) = (find("Start"), find("End"), find("Text")) else {
            return Err(malformed("Format line lacks Start, End or Text".to_string()));
        };
        if fields.len() <= text_idx {
            return Err(malformed(format!("expected {} fields, found {}", field_names.len(), fields.len())));
        }

        let start = SubtitleEntry::parse_ssa_timestamp(&fields[start_idx])
            .ok_or_else(|| malformed(format!("invalid start time '{}'", fields[start_idx])))?;
        let end = SubtitleEntry::parse_ssa_timestamp(&fields[end_idx])
            .ok_or_else(|| malformed(format!("invalid end time '{}'", fields[end_idx])))?;

        let line_break = SSA_BREAK_REGEX
            .find(&fields[text_idx])
            .map_or(SSA_HARD_BREAK, |m| m.as_str())
            .to_string();
        let lines = SSA_BREAK_REGEX
            .split(&fields[text_idx])
            .map(|s| s.trim().to_string())
            .collect();

        Ok(SubtitleEntry {
            seq_num,
            start_time_ms: start,
            end_time_ms: end.max(start),
            lines,
            ssa_event: Some(SsaEvent {
                fields,
                line_break,
                preceding: Vec::new(),
            }),
        })
    }

    /// Parse timestamp captures to milliseconds
    fn captures_to_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64, SubtitleError> {
        let mut values = [0u64; 4];
        for (offset, value) in values.iter_mut().enumerate() {
            *value = caps
                .get(start_idx + offset)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(|| SubtitleError::Malformed {
                    line: 0,
                    message: format!("invalid timestamp '{}'", &caps[0]),
                })?;
        }
        let [hours, minutes, seconds, millis] = values;
        Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
    }
}
