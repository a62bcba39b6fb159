//! Text rendering for list and detail output.

use datarecord_core::Record;

pub fn format_list(records: &[Record]) -> String {
    if records.is_empty() {
        return "(no records)".to_string();
    }
    records
        .iter()
        .map(format_row)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_row(record: &Record) -> String {
    format!("{:>6}  {}", record.id, single_line(&record.text))
}

pub fn format_detail(record: &Record) -> String {
    format!("id:   {}\ntext: {}", record.id, record.text)
}

fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::{format_detail, format_list};
    use datarecord_core::Record;

    #[test]
    fn empty_list_has_placeholder() {
        assert_eq!(format_list(&[]), "(no records)");
    }

    #[test]
    fn rows_are_right_aligned_and_single_line() {
        let rendered = format_list(&[Record::new(1, "a\nb"), Record::new(12, "c")]);
        assert_eq!(rendered, "     1  a b\n    12  c");
    }

    #[test]
    fn detail_keeps_text_verbatim() {
        assert_eq!(
            format_detail(&Record::new(3, "x\ny")),
            "id:   3\ntext: x\ny"
        );
    }
}
