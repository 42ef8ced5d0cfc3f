use std::fmt::{Display, Formatter};

use crate::subject::Subject::{
  ComputerScience, Engineering, English, French, Mathematics, Physics, Unspecified,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Subject {
  Mathematics,
  English,
  Engineering,
  French,
  ComputerScience,
  Physics,
  Unspecified,
}

impl Subject {
  pub fn label(&self) -> &'static str {
    match self {
      Mathematics => "Mathématiques",
      English => "Anglais",
      Engineering => "Sciences de l'Ingénieur",
      French => "Français",
      ComputerScience => "Informatique",
      Physics => "Physique",
      Unspecified => "Non spécifié",
    }
  }
}

impl Display for Subject {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

/// Identifier prefixes, tested in order. `SI` has to come before `I`.
pub const SUBJECT_RULES: &[(&str, Subject)] = &[
  ("M", Mathematics),
  ("A", English),
  ("SI", Engineering),
  ("F", French),
  ("I", ComputerScience),
  ("P", Physics),
];

/// Subject of a session identifier, first matching prefix wins.
pub fn classify(id: &str) -> Subject {
  let id = id.trim();

  SUBJECT_RULES
    .iter()
    .find(|(prefix, _)| id.starts_with(prefix))
    .map(|(_, subject)| *subject)
    .unwrap_or(Unspecified)
}
