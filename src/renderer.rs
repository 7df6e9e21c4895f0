use crate::aggregate::{NoteRecord, Status};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct Frontmatter<'a> {
    title: &'a str,
    created: &'a str,
    uuid: &'a str,
    id: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    keywords: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
}

/// Write `note` as Markdown: a YAML frontmatter block, a blank line, then the
/// note body verbatim.
pub fn render_note<W: Write>(
    writer: &mut W,
    uuid: &str,
    id: &str,
    note: &NoteRecord,
) -> std::io::Result<()> {
    let fm = Frontmatter {
        title: note.title(),
        created: note.created_at.as_deref().unwrap_or_default(),
        uuid,
        id,
        keywords: &note.tags,
        status: note.status,
    };

    // serde_yaml 0.9 does not emit a leading "---", so the fences are ours.
    let yaml = serde_yaml::to_string(&fm).map_err(std::io::Error::other)?;
    writeln!(writer, "---")?;
    write!(writer, "{}", yaml)?;
    writeln!(writer, "---")?;
    writeln!(writer)?;
    write!(writer, "{}", note.text)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Parsed {
        title: String,
        created: String,
        uuid: String,
        id: String,
        keywords: Option<Vec<String>>,
        status: Option<String>,
    }

    fn record() -> NoteRecord {
        NoteRecord {
            title: Some("personal-todo".into()),
            text: "## Title\n\nbody\n".into(),
            created_at: Some("2014-05-30T15:39:59.000Z".into()),
            updated_at: Some("2014-05-30T15:39:59.000Z".into()),
            status: None,
            tags: Vec::new(),
        }
    }

    fn render(note: &NoteRecord) -> (Parsed, String, String) {
        let mut out = Vec::new();
        render_note(&mut out, "1fa7d986", "20140530153959", note).unwrap();
        let text = String::from_utf8(out).unwrap();
        let rest = text.strip_prefix("---\n").unwrap();
        let (yaml, body) = rest.split_once("---\n\n").unwrap();
        let parsed = serde_yaml::from_str(yaml).unwrap();
        (parsed, yaml.to_string(), body.to_string())
    }

    #[test]
    fn required_fields_in_order() {
        let (fm, yaml, body) = render(&record());
        assert_eq!(fm.title, "personal-todo");
        assert_eq!(fm.created, "2014-05-30T15:39:59.000Z");
        assert_eq!(fm.uuid, "1fa7d986");
        assert_eq!(fm.id, "20140530153959");
        assert!(fm.keywords.is_none());
        assert!(fm.status.is_none());
        assert_eq!(body, "## Title\n\nbody\n");

        let keys: Vec<_> = yaml
            .lines()
            .filter_map(|l| l.split_once(':').map(|(k, _)| k))
            .collect();
        assert_eq!(keys, vec!["title", "created", "uuid", "id"]);
    }

    #[test]
    fn keywords_then_status() {
        let mut note = record();
        note.tags = vec!["personal.prose".into(), "pinned".into()];
        note.status = Some(Status::Trashed);
        let (fm, yaml, _) = render(&note);
        assert_eq!(
            fm.keywords.unwrap(),
            vec!["personal.prose".to_string(), "pinned".to_string()]
        );
        assert_eq!(fm.status.as_deref(), Some("trashed"));
        assert!(yaml.contains("status: trashed\n"));
        assert!(yaml.find("keywords:").unwrap() < yaml.find("status:").unwrap());
    }

    #[test]
    fn awkward_titles_stay_valid_yaml() {
        let mut note = record();
        note.title = Some("todo: #1 - \"quotes\"".into());
        let (fm, _, _) = render(&note);
        assert_eq!(fm.title, "todo: #1 - \"quotes\"");
    }
}
