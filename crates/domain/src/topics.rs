//! Topic names derived from the thing name.

/// The four channels the controller uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    /// Outbound reported-state documents.
    pub shadow_update: String,
    /// Inbound desired-state deltas.
    pub shadow_delta: String,
    /// Outbound credential check requests.
    pub card_check_request: String,
    /// Inbound credential verdicts.
    pub card_check_response: String,
}

impl Topics {
    #[must_use]
    pub fn for_thing(thing_name: &str) -> Self {
        Self {
            shadow_update: format!("$aws/things/{thing_name}/shadow/update"),
            shadow_delta: format!("$aws/things/{thing_name}/shadow/update/delta"),
            card_check_request: format!("{thing_name}/rfid/checkRequest"),
            card_check_response: format!("{thing_name}/rfid/checkResponse"),
        }
    }

    /// Topics the controller subscribes to after every (re)connection.
    #[must_use]
    pub fn inbound(&self) -> [&str; 2] {
        [&self.shadow_delta, &self.card_check_response]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_derive_topics_from_thing_name() {
        let topics = Topics::for_thing("MiCasa");
        assert_eq!(topics.shadow_update, "$aws/things/MiCasa/shadow/update");
        assert_eq!(topics.shadow_delta, "$aws/things/MiCasa/shadow/update/delta");
        assert_eq!(topics.card_check_request, "MiCasa/rfid/checkRequest");
        assert_eq!(topics.card_check_response, "MiCasa/rfid/checkResponse");
    }

    #[test]
    fn should_list_both_inbound_topics() {
        let topics = Topics::for_thing("t");
        assert_eq!(
            topics.inbound(),
            ["$aws/things/t/shadow/update/delta", "t/rfid/checkResponse"]
        );
    }
}
