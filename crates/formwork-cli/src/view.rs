//! Plain-text view of a rendered form.
//!
//! Each grid is drawn row by row, using the placement computed by
//! [`formwork::place`]. Leaf controls sharing a row sit side by side; groups
//! and arrays break out into indented blocks.

use colored::Colorize;
use formwork::{
    ArrayNode, Columns, Control, ControlNode, GroupNode, InputKind, Placement, RenderNode,
    RenderTree, SelectOption, ValidationErrors, place,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width of the top-level grid in terminal cells.
pub const VIEW_WIDTH: usize = 80;

const GAP: usize = 2;
const INDENT: usize = 2;

// -----------------------------------------------------------------------------
// Styled lines
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Heading,
    Label,
    Muted,
    Error,
    Action,
}

#[derive(Debug, Clone)]
struct Segment {
    text: String,
    tone: Tone,
}

impl Segment {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    fn paint(&self, color: bool) -> String {
        if !color {
            return self.text.clone();
        }
        match self.tone {
            Tone::Plain => self.text.clone(),
            Tone::Heading => self.text.bold().to_string(),
            Tone::Label => self.text.cyan().to_string(),
            Tone::Muted => self.text.dimmed().to_string(),
            Tone::Error => self.text.red().to_string(),
            Tone::Action => self.text.green().to_string(),
        }
    }
}

/// Renders `tree` as text, `color` enabling ANSI styling.
pub fn render_text(tree: &RenderTree, color: bool) -> String {
    let mut out = Vec::new();
    out.push(Segment::new(tree.title.clone(), Tone::Heading).paint(color));
    if let Some(description) = &tree.description {
        out.push(Segment::new(description.clone(), Tone::Muted).paint(color));
    }
    out.push(String::new());
    draw_grid(&tree.nodes, tree.cols, VIEW_WIDTH, 0, color, &mut out);
    out.join("\n")
}

/// Renders validation issues as one `path: message` line each.
pub fn errors_text(errors: &ValidationErrors, color: bool) -> String {
    errors
        .iter()
        .map(|issue| {
            let path = Segment::new(issue.path.to_string(), Tone::Label).paint(color);
            let message = Segment::new(issue.message.clone(), Tone::Error).paint(color);
            format!("{path}: {message}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// -----------------------------------------------------------------------------
// Grid
// -----------------------------------------------------------------------------

fn draw_grid(
    nodes: &[RenderNode],
    cols: Columns,
    width: usize,
    indent: usize,
    color: bool,
    out: &mut Vec<String>,
) {
    let placements = place(nodes.iter().map(RenderNode::col_span), cols);
    let mut row: Vec<(&ControlNode, Placement)> = Vec::new();
    let mut current_row = None;

    for (node, placement) in nodes.iter().zip(placements) {
        if current_row != Some(placement.row) {
            flush_row(&mut row, cols, width, indent, color, out);
            current_row = Some(placement.row);
        }
        match node {
            RenderNode::Control(control) => row.push((control, placement)),
            RenderNode::Group(group) => {
                flush_row(&mut row, cols, width, indent, color, out);
                draw_group(group, width, indent, color, out);
            }
            RenderNode::Array(array) => {
                flush_row(&mut row, cols, width, indent, color, out);
                draw_array(array, width, indent, color, out);
            }
        }
    }
    flush_row(&mut row, cols, width, indent, color, out);
}

fn flush_row(
    row: &mut Vec<(&ControlNode, Placement)>,
    cols: Columns,
    width: usize,
    indent: usize,
    color: bool,
    out: &mut Vec<String>,
) {
    if row.is_empty() {
        return;
    }
    let column_width = width / usize::from(cols.get());
    let cells: Vec<(usize, Vec<Vec<Segment>>)> = row
        .drain(..)
        .map(|(control, placement)| {
            let cell_width = (column_width * usize::from(placement.span)).saturating_sub(GAP);
            (cell_width, control_lines(control))
        })
        .collect();

    let height = cells.iter().map(|(_, lines)| lines.len()).max().unwrap_or(0);
    for line in 0..height {
        let mut text = " ".repeat(indent);
        for (cell_width, lines) in &cells {
            let segments = lines.get(line).map_or(&[][..], Vec::as_slice);
            text.push_str(&fit(segments, *cell_width, color));
            text.push_str(&" ".repeat(GAP));
        }
        out.push(text.trim_end().to_string());
    }
    out.push(String::new());
}

fn draw_group(group: &GroupNode, width: usize, indent: usize, color: bool, out: &mut Vec<String>) {
    out.push(heading(&group.label, group.description.as_deref(), indent, color));
    draw_grid(
        &group.children,
        group.cols,
        width.saturating_sub(INDENT),
        indent + INDENT,
        color,
        out,
    );
}

fn draw_array(array: &ArrayNode, width: usize, indent: usize, color: bool, out: &mut Vec<String>) {
    out.push(heading(&array.label, array.description.as_deref(), indent, color));
    let inner = indent + INDENT;
    for item in &array.items {
        let title = Segment::new(format!("#{}", item.index + 1), Tone::Label).paint(color);
        let remove = Segment::new("[remove]", Tone::Action).paint(color);
        out.push(format!("{}{title} {remove}", " ".repeat(inner)));
        draw_grid(
            &item.children,
            array.cols,
            width.saturating_sub(2 * INDENT),
            inner + INDENT,
            color,
            out,
        );
    }
    let add = Segment::new(format!("[+ {}]", array.add_label), Tone::Action).paint(color);
    out.push(format!("{}{add}", " ".repeat(inner)));
    out.push(String::new());
}

fn heading(label: &str, description: Option<&str>, indent: usize, color: bool) -> String {
    let mut text = format!(
        "{}{}",
        " ".repeat(indent),
        Segment::new(label, Tone::Heading).paint(color)
    );
    if let Some(description) = description {
        text.push_str(" - ");
        text.push_str(&Segment::new(description, Tone::Muted).paint(color));
    }
    text
}

// -----------------------------------------------------------------------------
// Controls
// -----------------------------------------------------------------------------

fn control_lines(node: &ControlNode) -> Vec<Vec<Segment>> {
    let mut label = vec![Segment::new(node.label.clone(), Tone::Label)];
    if node.required {
        label.push(Segment::new(" *", Tone::Error));
    }
    let mut lines = vec![label, widget(&node.control)];
    if let Some(description) = &node.description {
        lines.push(vec![Segment::new(description.clone(), Tone::Muted)]);
    }
    if let Some(error) = &node.error {
        lines.push(vec![Segment::new(error.clone(), Tone::Error)]);
    }
    lines
}

fn widget(control: &Control) -> Vec<Segment> {
    match control {
        Control::Input {
            input_type,
            value,
            placeholder,
        } => {
            let shown = if *input_type == InputKind::Password {
                "*".repeat(value.chars().count())
            } else {
                value.clone()
            };
            boxed(&shown, placeholder.as_deref())
        }
        Control::Textarea { value, placeholder } => boxed(value, placeholder.as_deref()),
        Control::Select {
            options,
            selected,
            placeholder,
        }
        | Control::Combobox {
            options,
            selected,
            placeholder,
        } => {
            let shown = selected
                .as_deref()
                .map(|value| option_label(options, value).to_string());
            let mut segments = vec![Segment::new("< ", Tone::Plain)];
            match shown {
                Some(text) => segments.push(Segment::new(text, Tone::Plain)),
                None => segments.push(Segment::new(
                    placeholder.clone().unwrap_or_else(|| "choose".to_string()),
                    Tone::Muted,
                )),
            }
            segments.push(Segment::new(" >", Tone::Plain));
            segments
        }
        Control::Checkbox { checked } => {
            vec![Segment::new(if *checked { "[x]" } else { "[ ]" }, Tone::Plain)]
        }
        Control::Radio { options, selected } => {
            let text = options
                .iter()
                .map(|option| {
                    let mark = if selected.as_deref() == Some(option.value.as_str()) {
                        "(o)"
                    } else {
                        "( )"
                    };
                    format!("{mark} {}", option.label)
                })
                .collect::<Vec<_>>()
                .join("  ");
            vec![Segment::new(text, Tone::Plain)]
        }
        Control::DatePicker { value, show_time } => {
            let hint = if *show_time { "yyyy-mm-dd hh:mm" } else { "yyyy-mm-dd" };
            boxed(value, Some(hint))
        }
        Control::FileUpload {
            files,
            accept,
            multiple,
            ..
        } => {
            if files.is_empty() {
                let mut hint = if *multiple { "no files" } else { "no file" }.to_string();
                if let Some(accept) = accept {
                    hint.push_str(&format!(" ({accept})"));
                }
                vec![Segment::new(hint, Tone::Muted)]
            } else {
                let names = files
                    .iter()
                    .map(|file| file.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![Segment::new(names, Tone::Plain)]
            }
        }
        Control::MultiSelect {
            options,
            selected,
            placeholder,
        } => {
            if selected.is_empty() {
                let hint = placeholder.clone().unwrap_or_else(|| "none".to_string());
                vec![Segment::new(format!("{{{hint}}}"), Tone::Muted)]
            } else {
                let labels = selected
                    .iter()
                    .map(|value| option_label(options, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![Segment::new(format!("{{{labels}}}"), Tone::Plain)]
            }
        }
        Control::Slider {
            value,
            min,
            max,
            step: _,
        } => vec![Segment::new(slider(*value, *min, *max), Tone::Plain)],
    }
}

fn boxed(value: &str, placeholder: Option<&str>) -> Vec<Segment> {
    let inner = match placeholder {
        Some(hint) if value.is_empty() => Segment::new(hint, Tone::Muted),
        _ => Segment::new(value, Tone::Plain),
    };
    vec![
        Segment::new("[", Tone::Plain),
        inner,
        Segment::new("]", Tone::Plain),
    ]
}

fn option_label<'a>(options: &'a [SelectOption], value: &'a str) -> &'a str {
    options
        .iter()
        .find(|option| option.value == value)
        .map_or(value, |option| option.label.as_str())
}

const SLIDER_TRACK: usize = 10;

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "knob position is clamped to the track"
)]
fn slider(value: Option<f64>, min: f64, max: f64) -> String {
    let span = max - min;
    let knob = match value {
        Some(v) if span > 0.0 => {
            (((v - min) / span).clamp(0.0, 1.0) * SLIDER_TRACK as f64).round() as usize
        }
        _ => 0,
    };
    let track: String = (0..=SLIDER_TRACK)
        .map(|i| if i == knob { 'o' } else { '-' })
        .collect();
    let shown = value.map_or_else(String::new, |v| format!(" {v}"));
    format!("{min} |{track}| {max}{shown}")
}

// -----------------------------------------------------------------------------
// Width handling
// -----------------------------------------------------------------------------

// Truncates the segments to `width` cells, pads with spaces, then paints.
fn fit(segments: &[Segment], width: usize, color: bool) -> String {
    let mut used = 0;
    let mut painted = String::new();
    for segment in segments {
        if used >= width {
            break;
        }
        let text = truncate(&segment.text, width - used);
        used += text.width();
        painted.push_str(&Segment::new(text, segment.tone).paint(color));
    }
    painted.push_str(&" ".repeat(width.saturating_sub(used)));
    painted
}

fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    if width > 0 {
        out.push('~');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork::{Condition, Field, FormDetail, FormEngine};

    fn engine() -> FormEngine {
        FormEngine::new(
            FormDetail::new(
                "User Information",
                vec![
                    Field::text("firstName", "First Name").required(),
                    Field::text("lastName", "Last Name"),
                    Field::select("maritalStatus", "Marital Status")
                        .option("Single", "single")
                        .option("Married", "married")
                        .value("single"),
                    Field::text("spouseName", "Spouse")
                        .condition(Condition::equals("maritalStatus", "married")),
                    Field::array(
                        "skills",
                        "Skills",
                        vec![Field::text("skillName", "Skill")],
                    ),
                ],
            )
            .description("About you"),
        )
        .unwrap()
    }

    #[test]
    fn test_render_text_without_color() {
        let text = render_text(&engine().render(), false);
        assert!(text.starts_with("User Information\nAbout you\n"));
        assert!(text.contains("First Name *"));
        assert!(text.contains("< Single >"));
        assert!(!text.contains("Spouse"));
        assert!(text.contains("#1 [remove]"));
        assert!(text.contains("[+ Add Skills]"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_side_by_side_cells() {
        let text = render_text(&engine().render(), false);
        let label_row = text
            .lines()
            .find(|line| line.contains("First Name"))
            .unwrap();
        assert!(label_row.contains("Last Name"));
    }

    #[test]
    fn test_lines_fit_view_width() {
        let text = render_text(&engine().render(), false);
        for line in text.lines() {
            assert!(line.width() <= VIEW_WIDTH, "too wide: {line:?}");
        }
    }

    #[test]
    fn test_truncate_wide_text() {
        assert_eq!(truncate("abcdef", 4), "abc~");
        assert_eq!(truncate("abc", 4), "abc");
        assert_eq!(truncate("日本語テキスト", 5).width(), 5);
    }

    #[test]
    fn test_slider_track() {
        assert_eq!(slider(Some(50.0), 0.0, 100.0), "0 |-----o-----| 100 50");
        assert_eq!(slider(None, 0.0, 10.0), "0 |o----------| 10");
    }
}
