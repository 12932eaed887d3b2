//! Lesson text segmentation.
//!
//! Lesson content is free text. It is turned into a displayable outline by
//! looking for known heading phrases (trend markers and career-path markers)
//! and by grouping bullet lines into lists. Two rule sets exist, one for the
//! "ICT trends" lesson and one for the career-path lessons; both run through
//! the same line walker.

use serde::{Deserialize, Serialize};

/// Heading phrases of the ICT trends lesson, in match order.
pub const TREND_KEYWORDS: [&str; 12] = [
    "Superapps the ICT supertrend",
    "Explosion of the metaverse",
    "Digital twins",
    "MedTech, the revolution in medicine",
    "Artificial Intelligence and Cybersecurity",
    "Blockchain, one of the most secure ICT trends",
    "Issues in Information and Communications Technology (ICT)",
    "Cybersecurity threats",
    "Data privacy and regulation",
    "Artificial Intelligence (AI) and automation",
    "Slow Internet Connections",
    "Viruses",
];

/// Heading phrases of the career-path lessons, in match order.
pub const CAREER_PATH_KEYWORDS: [&str; 6] = [
    "Web and game developer",
    "Visual Arts Animator/Illustrator",
    "Computer System Servicing",
    "Computer/Network technician",
    "Call center agents",
    "Telecommunication",
];

/// Title of the section that precedes the first heading.
pub const INTRODUCTION: &str = "Introduction";

/// All of these must appear in a lesson for the trends layout to be used.
const TRENDS_LESSON_MARKERS: [&str; 3] = ["ICT trends", "Superapps", "metaverse"];

const BULLET: char = '•';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Paragraph { content: String },
    List { items: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Trend,
    Section,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Section {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CareerPathGroup {
    pub career_path: Option<String>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "layout", content = "sections", rename_all = "snake_case")]
pub enum LessonOutline {
    Trends(Vec<Section>),
    CareerPaths(Vec<CareerPathGroup>),
}

/// How bullet lines are recognised and how their marker is stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletStyle {
    /// `• ` at line start, or a line whose trimmed text starts with `-`.
    GlyphOrHyphen,
    /// `• ` at line start only.
    GlyphOnly,
}

impl BulletStyle {
    pub fn is_bullet(self, line: &str) -> bool {
        match self {
            Self::GlyphOrHyphen => strip_glyph(line).is_some() || line.trim().starts_with('-'),
            Self::GlyphOnly => strip_glyph(line).is_some(),
        }
    }

    pub fn item_text(self, line: &str) -> String {
        match self {
            Self::GlyphOrHyphen => match strip_glyph(line) {
                Some(rest) => rest.trim().to_string(),
                None => strip_first_hyphen(line).trim().to_string(),
            },
            Self::GlyphOnly => line
                .replacen("•\t", "", 1)
                .replacen(BULLET, "", 1)
                .trim()
                .to_string(),
        }
    }
}

/// Parameters of one segmentation pass.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRules {
    /// Keyword lists checked in order; the first list with a hit wins.
    pub keyword_sets: &'static [&'static [&'static str]],
    /// Whether a heading line switches following sections to [`SectionKind::Trend`].
    pub raises_trend_flag: fn(line: &str, keyword: &str) -> bool,
    pub bullets: BulletStyle,
}

impl SegmentRules {
    pub fn trends() -> Self {
        Self {
            keyword_sets: &[&TREND_KEYWORDS, &CAREER_PATH_KEYWORDS],
            raises_trend_flag: |line, keyword| {
                line.contains("the following patterns")
                    || keyword == TREND_KEYWORDS[0]
                    || line.contains("Issues in Information")
            },
            bullets: BulletStyle::GlyphOrHyphen,
        }
    }

    pub fn career_paths() -> Self {
        Self {
            keyword_sets: &[&CAREER_PATH_KEYWORDS],
            raises_trend_flag: |_, _| false,
            bullets: BulletStyle::GlyphOnly,
        }
    }

    fn match_keyword(&self, line: &str) -> Option<&'static str> {
        self.keyword_sets
            .iter()
            .find_map(|set| set.iter().copied().find(|kw| line.contains(kw)))
    }
}

/// A run of lines opened by a heading (or the leading run without one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment<'t> {
    pub heading: Option<&'static str>,
    pub trend: bool,
    pub lines: Vec<&'t str>,
}

/// First pass: cut the text into segments at heading lines.
pub fn split_segments<'t>(text: &'t str, rules: &SegmentRules) -> Vec<RawSegment<'t>> {
    let mut segments = Vec::new();
    let mut heading = None;
    let mut current: Vec<&'t str> = Vec::new();
    let mut in_trends = false;

    for line in text.split('\n') {
        match rules.match_keyword(line) {
            Some(keyword) => {
                if !current.is_empty() {
                    segments.push(RawSegment {
                        heading,
                        trend: in_trends,
                        lines: std::mem::take(&mut current),
                    });
                }
                heading = Some(keyword);
                current.push(line);

                if (rules.raises_trend_flag)(line, keyword) {
                    in_trends = true;
                }
            }
            None if !current.is_empty() || !line.trim().is_empty() => current.push(line),
            None => {}
        }
    }

    if !current.is_empty() {
        segments.push(RawSegment {
            heading,
            trend: in_trends,
            lines: current,
        });
    }

    segments
}

/// Second pass: group a segment's lines into paragraph and list blocks.
pub fn group_blocks(lines: &[&str], bullets: BulletStyle) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut in_list = false;

    for &line in lines {
        if bullets.is_bullet(line) {
            let item = bullets.item_text(line);
            if in_list {
                if let Some(Block::List { items }) = blocks.last_mut() {
                    items.push(item);
                    continue;
                }
            }
            flush_paragraph(&mut paragraph, &mut blocks);
            in_list = true;
            blocks.push(Block::List { items: vec![item] });
        } else {
            in_list = false;
            if line.trim().is_empty() {
                flush_paragraph(&mut paragraph, &mut blocks);
            } else {
                paragraph.push(line);
            }
        }
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph {
            content: paragraph.join(" "),
        });
        paragraph.clear();
    }
}

pub fn trend_sections(text: &str) -> Vec<Section> {
    let rules = SegmentRules::trends();
    split_segments(text, &rules)
        .into_iter()
        .map(|segment| Section {
            title: segment.heading.unwrap_or(INTRODUCTION).to_string(),
            kind: if segment.trend {
                SectionKind::Trend
            } else {
                SectionKind::Section
            },
            blocks: group_blocks(&segment.lines, rules.bullets),
        })
        .collect()
}

pub fn career_path_groups(text: &str) -> Vec<CareerPathGroup> {
    let rules = SegmentRules::career_paths();
    split_segments(text, &rules)
        .into_iter()
        .map(|segment| CareerPathGroup {
            career_path: segment.heading.map(str::to_string),
            blocks: group_blocks(&segment.lines, rules.bullets),
        })
        .collect()
}

pub fn is_trends_lesson(text: &str) -> bool {
    TRENDS_LESSON_MARKERS.iter().all(|m| text.contains(m))
}

/// Outline for a lesson body, picking the layout from the text itself.
pub fn segment_lesson(text: &str) -> LessonOutline {
    if is_trends_lesson(text) {
        LessonOutline::Trends(trend_sections(text))
    } else {
        LessonOutline::CareerPaths(career_path_groups(text))
    }
}

fn strip_glyph(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(BULLET)?;
    let ws = rest.chars().next().filter(|c| c.is_whitespace())?;
    Some(&rest[ws.len_utf8()..])
}

// Removes the first "-<whitespace>" anywhere in the line.
fn strip_first_hyphen(line: &str) -> String {
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '-' {
            continue;
        }
        if let Some(&(j, next)) = chars.peek() {
            if next.is_whitespace() {
                return format!("{}{}", &line[..i], &line[j + next.len_utf8()..]);
            }
        }
    }
    line.to_string()
}
