use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::{Name, WordList};

fn words(list: &WordList) -> Vec<&str> {
    list.iter().map(|w| w.as_str()).collect()
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Name", 4)?;
        state.serialize_field("first", &words(&self.first))?;
        state.serialize_field("von", &words(&self.von))?;
        state.serialize_field("last", &words(&self.last))?;
        state.serialize_field("jr", &words(&self.jr))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use crate::Name;

    #[test]
    fn names_serialize_as_word_lists() {
        let name = Name::parse("von Neumann, John").unwrap();
        assert_eq!(
            serde_json::to_string(&name).unwrap(),
            r#"{"first":["John"],"von":["von"],"last":["Neumann"],"jr":[]}"#
        );
    }

    #[test]
    fn blank_names_serialize_with_empty_parts() {
        let name = Name::parse("").unwrap();
        assert_eq!(
            serde_json::to_string(&name).unwrap(),
            r#"{"first":[],"von":[],"last":[],"jr":[]}"#
        );
    }
}
