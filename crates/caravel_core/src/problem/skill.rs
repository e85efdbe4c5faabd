use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Skill(String);

impl Skill {
    pub fn new(skill: impl Into<String>) -> Self {
        Skill(skill.into())
    }
}

pub type Skills = FxHashSet<Skill>;

pub fn skills_from(names: impl IntoIterator<Item = impl Into<String>>) -> Skills {
    names.into_iter().map(Skill::new).collect()
}
