use std::{fmt, str::FromStr};

use anyhow::bail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    ItConsultant,
    CareerAdvisor,
}

impl Persona {
    /// Every persona offered to the user, in selector order.
    pub const ALL: [Persona; 2] = [Persona::ItConsultant, Persona::CareerAdvisor];

    pub fn id(&self) -> &'static str {
        match self {
            Persona::ItConsultant => "it_consultant",
            Persona::CareerAdvisor => "career_advisor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Persona::ItConsultant => "IT consultant",
            Persona::CareerAdvisor => "Career advisor",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Persona::ItConsultant => {
                "Advice on IT strategy, system development and technology selection"
            }
            Persona::CareerAdvisor => {
                "Advice on job changes, career development and skill building"
            }
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Persona::ItConsultant => concat!(
                "You are an experienced IT consultant. Provide practical, expert advice on ",
                "IT strategy, system development, digital transformation, ",
                "technology selection and related topics."
            ),
            Persona::CareerAdvisor => concat!(
                "You are an experienced career advisor. Provide practical, concrete advice on ",
                "changing jobs, career development, skill building, ",
                "writing a CV and related topics."
            ),
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::ALL[0]
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Persona {
    type Err = anyhow::Error;

    /// Accepts either the persona id or its display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::ALL
            .into_iter()
            .find(|persona| persona.id() == s || persona.label() == s)
        {
            Some(persona) => Ok(persona),
            None => bail!("unknown persona '{s}', expected one of: {}", ids()),
        }
    }
}

fn ids() -> String {
    Persona::ALL
        .iter()
        .map(|persona| persona.id())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn can_lookup_prompt_for_every_persona() {
        for persona in Persona::ALL {
            assert!(!persona.system_prompt().trim().is_empty(), "{persona:?}");
            assert!(!persona.summary().is_empty(), "{persona:?}");
        }
    }

    #[test]
    fn can_parse_persona_from_id_and_label() {
        for persona in Persona::ALL {
            assert_eq!(persona.id().parse::<Persona>().unwrap(), persona);
            assert_eq!(persona.label().parse::<Persona>().unwrap(), persona);
        }
    }

    #[test]
    fn persona_ids_and_labels_are_unique() {
        let ids: HashSet<_> = Persona::ALL.iter().map(|x| x.id()).collect();
        let labels: HashSet<_> = Persona::ALL.iter().map(|x| x.label()).collect();
        assert_eq!(ids.len(), Persona::ALL.len());
        assert_eq!(labels.len(), Persona::ALL.len());
    }

    #[test]
    fn unknown_persona_is_rejected() {
        let err = "astrologer".parse::<Persona>().unwrap_err();
        assert!(err.to_string().contains("astrologer"));
        assert!(err.to_string().contains("it_consultant"));
    }

    #[test]
    fn it_consultant_prompt_describes_it_expertise() {
        let prompt = Persona::ItConsultant.system_prompt();
        assert!(prompt.contains("IT consultant"));
        assert_eq!(Persona::default(), Persona::ItConsultant);
    }
}
