//! Paginated placement of report lines.
//!
//! [`render`] consumes an ordered list of [`RenderInstruction`]s and assigns each one a line on a
//! fixed-size page. The vertical cursor advances by one line height per instruction; when the
//! advanced cursor lies strictly below the usable page height, the next line opens a new page.
//! A line may therefore sit exactly on the page height, but never past it.

use std::fmt;

use log::debug;

use crate::label::humanize_label;
use crate::layout::PageLayout;

/// One unit of content to place on the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderInstruction {
    /// Document title, drawn at the largest emphasis.
    Title {
        /// Title text.
        text: String,
    },
    /// Heading that opens a group of fields.
    SectionHeader {
        /// Heading text.
        title: String,
    },
    /// A labelled value rendered as `"{label}: {value}"`.
    ///
    /// Camel-cased labels are humanized at render time, see [`humanize_label`].
    Field {
        /// Raw label, possibly a camel-cased key.
        label: String,
        /// Value already converted to its display form.
        value: String,
    },
    /// Free-standing text line.
    ListItem {
        /// Item text.
        text: String,
    },
}

impl RenderInstruction {
    /// Creates a title instruction.
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title { text: text.into() }
    }

    /// Creates a section header instruction.
    pub fn section(title: impl Into<String>) -> Self {
        Self::SectionHeader {
            title: title.into(),
        }
    }

    /// Creates a field instruction, coercing the value through its `Display` implementation.
    pub fn field(label: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::Field {
            label: label.into(),
            value: value.to_string(),
        }
    }

    /// Creates a list item instruction.
    pub fn item(text: impl Into<String>) -> Self {
        Self::ListItem { text: text.into() }
    }

    /// Emphasis level the line is drawn with.
    pub fn emphasis(&self) -> Emphasis {
        match self {
            Self::Title { .. } => Emphasis::Title,
            Self::SectionHeader { .. } => Emphasis::Heading,
            Self::Field { .. } | Self::ListItem { .. } => Emphasis::Body,
        }
    }

    /// Formats the instruction as the single line of text that will be drawn.
    pub fn display_text(&self) -> String {
        match self {
            Self::Title { text } | Self::ListItem { text } => text.clone(),
            Self::SectionHeader { title } => title.clone(),
            Self::Field { label, value } => format!("{}: {}", humanize_label(label), value),
        }
    }
}

/// Typographic weight of a positioned line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Emphasis {
    /// Document title.
    Title,
    /// Section heading.
    Heading,
    /// Regular text.
    #[default]
    Body,
}

/// A line of text bound to a page and a position on it.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedLine {
    /// Text to draw.
    pub text: String,
    /// Horizontal position in layout units.
    pub x: f64,
    /// Vertical position in layout units, measured from the top of the page.
    pub y: f64,
    /// Zero-based page index.
    pub page_index: usize,
    /// Emphasis level to draw the text with.
    pub emphasis: Emphasis,
}

struct Cursor {
    y: f64,
    page_index: usize,
}

impl Cursor {
    fn new(layout: &PageLayout) -> Self {
        Self {
            y: layout.top_margin(),
            page_index: 0,
        }
    }

    fn advance(&mut self, layout: &PageLayout) {
        self.y += layout.line_height();
        if self.y > layout.page_height() {
            self.page_index += 1;
            self.y = layout.page_reset_y();
            debug!("page break: continuing on page {}", self.page_index + 1);
        }
    }
}

/// Places every instruction on a page, one line each, in the given order.
pub fn render(instructions: &[RenderInstruction], layout: &PageLayout) -> Vec<PositionedLine> {
    let mut cursor = Cursor::new(layout);
    let mut lines = Vec::with_capacity(instructions.len());

    for instruction in instructions {
        lines.push(PositionedLine {
            text: instruction.display_text(),
            x: layout.left_margin(),
            y: cursor.y,
            page_index: cursor.page_index,
            emphasis: instruction.emphasis(),
        });
        cursor.advance(layout);
    }

    lines
}

/// Number of pages occupied by `lines`; zero when nothing was rendered.
pub fn page_count(lines: &[PositionedLine]) -> usize {
    lines.last().map_or(0, |line| line.page_index + 1)
}

/// Groups consecutive lines that share a page index.
pub fn pages(lines: &[PositionedLine]) -> Vec<&[PositionedLine]> {
    let mut pages = Vec::new();
    let mut start = 0;
    for index in 1..=lines.len() {
        if index == lines.len() || lines[index].page_index != lines[start].page_index {
            pages.push(&lines[start..index]);
            start = index;
        }
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(count: usize) -> Vec<RenderInstruction> {
        (0..count)
            .map(|index| RenderInstruction::field("Line", index))
            .collect()
    }

    #[test]
    fn emits_one_line_per_instruction() {
        let lines = render(&fields(64), &PageLayout::default());
        assert_eq!(lines.len(), 64);
    }

    #[test]
    fn boundary_line_stays_on_the_page() {
        let lines = render(&fields(28), &PageLayout::default());

        assert_eq!(lines[25].y, 270.0);
        assert_eq!(lines[25].page_index, 0);
        assert_eq!(lines[26].y, 280.0);
        assert_eq!(lines[26].page_index, 0);
        assert_eq!(lines[27].y, 20.0);
        assert_eq!(lines[27].page_index, 1);
    }

    #[test]
    fn consecutive_lines_on_a_page_are_one_line_apart() {
        let layout = PageLayout::default();
        let lines = render(&fields(80), &layout);
        for pair in lines.windows(2) {
            if pair[0].page_index == pair[1].page_index {
                assert_eq!(pair[1].y, pair[0].y + layout.line_height());
            } else {
                assert_eq!(pair[1].page_index, pair[0].page_index + 1);
                assert_eq!(pair[1].y, layout.page_reset_y());
            }
        }
    }

    #[test]
    fn continuation_pages_use_reset_position() {
        let layout = PageLayout::new(100.0, 40.0, 10.0)
            .and_then(|layout| layout.with_page_reset_y(15.0))
            .unwrap();
        let lines = render(&fields(9), &layout);

        // 40..=100 holds seven lines.
        assert_eq!(lines[6].y, 100.0);
        assert_eq!(lines[7].page_index, 1);
        assert_eq!(lines[7].y, 15.0);
        assert_eq!(lines[8].y, 25.0);
    }

    #[test]
    fn empty_input_renders_nothing() {
        let lines = render(&[], &PageLayout::default());
        assert!(lines.is_empty());
        assert_eq!(page_count(&lines), 0);
        assert!(pages(&lines).is_empty());
    }

    #[test]
    fn formats_each_instruction_kind() {
        let instructions = vec![
            RenderInstruction::title("Medical Report"),
            RenderInstruction::section("Sleep Summary"),
            RenderInstruction::field("apneaEventsDetected", 5),
            RenderInstruction::field("EEG File Name", "sleep_study1.edf"),
            RenderInstruction::item("Consult a specialist"),
        ];
        let lines = render(&instructions, &PageLayout::default());
        let texts: Vec<_> = lines.iter().map(|line| line.text.as_str()).collect();

        assert_eq!(
            texts,
            [
                "Medical Report",
                "Sleep Summary",
                "apnea Events Detected: 5",
                "EEG File Name: sleep_study1.edf",
                "Consult a specialist",
            ]
        );
        assert_eq!(lines[0].emphasis, Emphasis::Title);
        assert_eq!(lines[1].emphasis, Emphasis::Heading);
        assert_eq!(lines[2].emphasis, Emphasis::Body);
        assert!(lines.iter().all(|line| line.x == 20.0));
    }

    #[test]
    fn rendering_is_repeatable() {
        let instructions = fields(45);
        let layout = PageLayout::default();
        assert_eq!(render(&instructions, &layout), render(&instructions, &layout));
    }

    #[test]
    fn groups_lines_by_page() {
        let lines = render(&fields(60), &PageLayout::default());
        let grouped = pages(&lines);

        assert_eq!(page_count(&lines), 3);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].len(), 27);
        assert_eq!(grouped[1].len(), 27);
        assert_eq!(grouped[2].len(), 6);
    }
}
