use anyhow::{anyhow, Context};
use serde_json::{json, Value};

use crate::chart::ChartState;
use crate::model::{Classroom, Student};

/// Parses pasted roster text: tried as a JSON array first, then as
/// header-driven CSV.
pub fn parse_roster_text(text: &str) -> Vec<Value> {
    if let Ok(Value::Array(records)) = serde_json::from_str::<Value>(text) {
        return records;
    }
    parse_csv(text)
}

/// Header-driven CSV to loosely-typed records. The first non-empty
/// line names the columns (lowercased); short rows pad with empty
/// strings. Fewer than two lines yields no records.
pub fn parse_csv(text: &str) -> Vec<Value> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Vec::new();
    }
    let headers: Vec<String> = lines[0]
        .split(',')
        .map(|h| h.trim().trim_matches('"').to_lowercase())
        .collect();

    lines[1..]
        .iter()
        .map(|line| {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            let mut obj = serde_json::Map::new();
            for (idx, header) in headers.iter().enumerate() {
                let value = values
                    .get(idx)
                    .map(|v| v.trim_matches('"'))
                    .unwrap_or("");
                obj.insert(header.clone(), Value::String(value.to_string()));
            }
            Value::Object(obj)
        })
        .collect()
}

/// Admits roster records into the chart. Only records carrying a
/// non-empty name are added; the rest are skipped without failing the
/// batch. Returns the admitted count.
pub fn admit_students(chart: &mut ChartState, records: &[Value]) -> usize {
    let mut count = 0;
    for record in records {
        let name = record
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            continue;
        }
        let mut student = Student::with_name(name);
        student.student_id = field(record, "student_id");
        student.grade = field(record, "grade");
        student.group = field(record, "group");
        student.note = field(record, "note");
        chart.add_student(student);
        count += 1;
    }
    count
}

fn field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// The interchange JSON document.
pub fn export_json(chart: &ChartState) -> Value {
    let arrangement: Vec<Value> = chart
        .arrangement
        .iter()
        .map(|(seat, student)| json!([seat, student]))
        .collect();
    json!({
        "classroom": chart.classroom,
        "students": chart.students,
        "seatingArrangement": arrangement,
    })
}

/// One quoted row per student; the seat column stays empty for
/// unassigned students.
pub fn export_csv(chart: &ChartState) -> String {
    let mut csv = String::from("id,student_id,name,grade,group,note,seat\n");
    for student in &chart.students {
        let seat = chart.seat_of(&student.id).unwrap_or_default();
        let row = [
            student.id.as_str(),
            student.student_id.as_str(),
            student.name.as_str(),
            student.grade.as_str(),
            student.group.as_str(),
            student.note.as_str(),
            seat.as_str(),
        ];
        let quoted: Vec<String> = row.iter().map(|f| quote_csv(f)).collect();
        csv.push_str(&quoted.join(","));
        csv.push('\n');
    }
    csv
}

fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// A fully parsed interchange document, validated before anything in
/// the live chart is touched.
pub struct ChartDocument {
    pub classroom: Option<Classroom>,
    pub students: Vec<Student>,
    pub arrangement: Vec<(String, String)>,
}

pub fn parse_chart_document(data: &Value) -> anyhow::Result<ChartDocument> {
    let classroom = match data.get("classroom") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            serde_json::from_value(v.clone()).context("malformed classroom record")?,
        ),
    };
    let students: Vec<Student> = match data.get("students") {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => serde_json::from_value(v.clone()).context("malformed student list")?,
    };
    let arrangement = match data.get("seatingArrangement") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(pairs)) => pairs
            .iter()
            .map(|pair| {
                let seat = pair
                    .get(0)
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow!("arrangement entry missing seat id"))?;
                let student = pair
                    .get(1)
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow!("arrangement entry missing student id"))?;
                Ok((seat.to_string(), student.to_string()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?,
        Some(_) => return Err(anyhow!("seatingArrangement must be an array of pairs")),
    };
    Ok(ChartDocument {
        classroom,
        students,
        arrangement,
    })
}

/// Replaces classroom, roster, and arrangement from a parsed document.
/// The seat grid is kept as-is, so a document exported from the
/// current session re-pairs against the same seat identities.
pub fn apply_chart_document(chart: &mut ChartState, doc: ChartDocument) {
    chart.classroom = doc.classroom;
    chart.students = doc.students;
    chart.arrangement = doc.arrangement.into_iter().collect();
    chart.locked_seats.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_parse_maps_headers_to_fields() {
        let records = parse_csv("name,grade,group\nAlice,A,red\nBob,B,blue\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Alice");
        assert_eq!(records[1]["group"], "blue");
    }

    #[test]
    fn csv_parse_pads_short_rows() {
        let records = parse_csv("name,grade\nAlice\n");
        assert_eq!(records[0]["name"], "Alice");
        assert_eq!(records[0]["grade"], "");
    }

    #[test]
    fn roster_text_accepts_json_array_or_csv() {
        let json_records = parse_roster_text(r#"[{"name": "Alice"}]"#);
        assert_eq!(json_records.len(), 1);

        let csv_records = parse_roster_text("name\nBob\n");
        assert_eq!(csv_records[0]["name"], "Bob");
    }

    #[test]
    fn admit_skips_nameless_records_and_counts_the_rest() {
        let mut chart = ChartState::default();
        let records = vec![
            json!({"name": "Alice", "grade": "A"}),
            json!({"grade": "B"}),
            json!({"name": "  "}),
            json!({"name": "Cara", "note": "front row"}),
        ];
        assert_eq!(admit_students(&mut chart, &records), 2);
        assert_eq!(chart.students.len(), 2);
        assert_eq!(chart.students[1].note, "front row");
    }

    #[test]
    fn export_csv_quotes_fields_and_fills_seat_column() {
        let mut chart = ChartState::default();
        chart.create_classroom("r".into(), 1, 1, 50, 5, "grid".into(), "front".into());
        let mut s = Student::with_name("Alice \"Ace\"");
        s.grade = "A".to_string();
        let sid = s.id.clone();
        chart.add_student(s);
        let seat = chart.seats[0].id.clone();
        chart.assign(&sid, &seat);

        let csv = export_csv(&chart);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,student_id,name,grade,group,note,seat"));
        let row = lines.next().expect("one student row");
        assert!(row.contains("\"Alice \"\"Ace\"\"\""));
        assert!(row.ends_with(&format!("\"{seat}\"")));
    }

    #[test]
    fn json_export_round_trips_through_chart_document() {
        let mut chart = ChartState::default();
        chart.create_classroom("3A".into(), 2, 2, 50, 5, "grid".into(), "front".into());
        for name in ["Alice", "Bob"] {
            chart.add_student(Student::with_name(name));
        }
        let (alice, seat) = (chart.students[0].id.clone(), chart.seats[0].id.clone());
        chart.assign(&alice, &seat);

        let doc = export_json(&chart);
        let parsed = parse_chart_document(&doc).expect("parse exported document");

        let mut restored = ChartState::default();
        restored.seats = chart.seats.clone();
        apply_chart_document(&mut restored, parsed);

        assert_eq!(restored.classroom, chart.classroom);
        assert_eq!(restored.students, chart.students);
        assert_eq!(restored.arrangement, chart.arrangement);
    }

    #[test]
    fn malformed_arrangement_is_rejected_whole() {
        let doc = json!({"seatingArrangement": [["seat-1"]]});
        assert!(parse_chart_document(&doc).is_err());
    }
}
