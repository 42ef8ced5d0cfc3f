use std::fmt::Write;

use colloscope_core::resolver::{Outcome, HEADERS};
use colloscope_core::Lookup;

pub fn table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> String {
  let mut widths = headers.map(|header| header.chars().count());
  for row in rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let mut separator = String::from("+");
  for width in widths {
    separator.push_str(&"-".repeat(width + 2));
    separator.push('+');
  }

  let mut buf = String::new();
  writeln!(buf, "{separator}").unwrap();
  line(&mut buf, headers.iter().copied(), &widths);
  writeln!(buf, "{separator}").unwrap();
  for row in rows {
    line(&mut buf, row.iter().map(String::as_str), &widths);
  }
  writeln!(buf, "{separator}").unwrap();

  buf
}

fn line<'a>(buf: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
  buf.push('|');
  for (cell, width) in cells.zip(widths) {
    let padding = width - cell.chars().count();
    write!(buf, " {}{} |", cell, " ".repeat(padding)).unwrap();
  }
  buf.push('\n');
}

/// Title and session table of a lookup.
pub fn lookup(lookup: &Lookup) -> String {
  let request = &lookup.request;
  let mut buf = format!(
    "Classe {}, groupe {}, semaine {}",
    request.class, request.group, request.week
  );

  match &lookup.outcome {
    Outcome::NoSession { available, .. } => {
      write!(
        buf,
        "\nAucune colle cette semaine : le colloscope du groupe compte {available} semaines.\n"
      )
      .unwrap();
    }
    Outcome::Rows { rows, .. } if rows.is_empty() => {
      buf.push_str("\nAucune colle cette semaine.\n");
    }
    Outcome::Rows { label, rows } => {
      if let Some(label) = label {
        write!(buf, " ({label})").unwrap();
      }
      buf.push('\n');

      let rows = rows.iter().map(|row| row.columns()).collect::<Vec<_>>();
      buf.push_str(&table(HEADERS, &rows));
    }
  }

  buf
}

#[cfg(test)]
mod test {
  use colloscope_core::resolver::{Row, Session};
  use colloscope_core::subject::Subject;
  use colloscope_core::table::WeekLabel;
  use colloscope_core::Request;

  use super::*;

  fn request() -> Request {
    Request {
      group: "G3".to_string(),
      week: 5,
      class: "1".to_string(),
    }
  }

  #[test]
  fn aligned_columns() {
    let rows = [["Mme Lévêque".to_string(), "Lundi".to_string()]];
    assert_eq!(
      table(["Professeur", "Jour"], &rows),
      "\
+-------------+-------+
| Professeur  | Jour  |
+-------------+-------+
| Mme Lévêque | Lundi |
+-------------+-------+
"
    );
  }

  #[test]
  fn lookup_with_rows() {
    let lookup = Lookup {
      request: request(),
      outcome: Outcome::Rows {
        label: Some(WeekLabel { day: 14, month: 10 }),
        rows: vec![
          Row::Resolved(Session {
            id: "P2".to_string(),
            fields: ["Roux", "Mardi", "17h", "B2"].map(str::to_string).to_vec(),
            subject: Subject::Physics,
          }),
          Row::Unresolved("Q1".to_string()),
        ],
      },
    };

    let text = super::lookup(&lookup);
    assert!(text.starts_with("Classe 1, groupe G3, semaine 5 (14/10)\n"));
    assert!(text.contains("| Professeur "));
    assert!(text.contains("| Roux "));
    assert!(text.contains("| Physique "));
    assert!(text.contains("| Identifiant inconnu : Q1 "));
  }

  #[test]
  fn lookup_without_session() {
    let lookup = Lookup {
      request: request(),
      outcome: Outcome::NoSession {
        week: 5,
        available: 4,
      },
    };

    assert_eq!(
      super::lookup(&lookup),
      "Classe 1, groupe G3, semaine 5\nAucune colle cette semaine : le colloscope du groupe compte 4 semaines.\n"
    );
  }
}
