use {
    serde::{Deserialize, Serialize, Serializer},
    std::collections::HashMap,
};

/// Classification of the user consent signal attached to an auction.
///
/// Serialized by numeric value; the collector identifies states by these
/// discriminants. `SomeConsent` is reserved: classification never produces
/// it today, but its slot must stay stable for wire compatibility.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConsentState {
    NoConsent = 0,
    Consent = 1,
    SomeConsent = 2,
    Undefined = 3,
}

impl Serialize for ConsentState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Consent signal as handed over by the host, already parsed out of the
/// consent framework's string format.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentPayload {
    pub vendor_data: Option<VendorData>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorData {
    #[serde(default)]
    pub purpose_consents: HashMap<String, bool>,
    #[serde(default)]
    pub vendor_consents: HashMap<String, bool>,
}

/// Maps the optional consent payload to a consent state. Idempotent given
/// the same payload.
///
/// No flags at all means the signal never arrived (e.g. no applicable
/// regulation). Otherwise consent is only given when every purpose and every
/// vendor flag is true.
pub fn classify(payload: Option<&ConsentPayload>) -> ConsentState {
    let vendor_data = payload.and_then(|payload| payload.vendor_data.as_ref());
    let purposes = vendor_data.map(|data| &data.purpose_consents);
    let vendors = vendor_data.map(|data| &data.vendor_consents);

    let empty = |flags: Option<&HashMap<String, bool>>| flags.is_none_or(HashMap::is_empty);
    if empty(purposes) && empty(vendors) {
        return ConsentState::Undefined;
    }

    let all = |flags: Option<&HashMap<String, bool>>| {
        flags.is_none_or(|flags| flags.values().all(|granted| *granted))
    };
    if all(purposes) && all(vendors) {
        ConsentState::Consent
    } else {
        ConsentState::NoConsent
    }
}

#[cfg(test)]
mod tests {
    use {super::*, maplit::hashmap};

    fn payload(
        purposes: HashMap<String, bool>,
        vendors: HashMap<String, bool>,
    ) -> ConsentPayload {
        ConsentPayload {
            vendor_data: Some(VendorData {
                purpose_consents: purposes,
                vendor_consents: vendors,
            }),
        }
    }

    #[test]
    fn no_signal_is_undefined() {
        assert_eq!(classify(None), ConsentState::Undefined);
        assert_eq!(
            classify(Some(&ConsentPayload::default())),
            ConsentState::Undefined
        );
        assert_eq!(
            classify(Some(&payload(hashmap! {}, hashmap! {}))),
            ConsentState::Undefined
        );
    }

    #[test]
    fn all_granted_is_consent() {
        let payload = payload(
            hashmap! { "1".to_owned() => true, "2".to_owned() => true },
            hashmap! { "42".to_owned() => true },
        );
        assert_eq!(classify(Some(&payload)), ConsentState::Consent);
    }

    #[test]
    fn one_sided_signal_with_all_granted_is_consent() {
        let payload = payload(hashmap! { "1".to_owned() => true }, hashmap! {});
        assert_eq!(classify(Some(&payload)), ConsentState::Consent);
    }

    #[test]
    fn any_denied_flag_is_no_consent() {
        let denied_purpose = payload(
            hashmap! { "1".to_owned() => true, "2".to_owned() => false },
            hashmap! { "42".to_owned() => true },
        );
        assert_eq!(classify(Some(&denied_purpose)), ConsentState::NoConsent);

        let denied_vendor = payload(
            hashmap! { "1".to_owned() => true },
            hashmap! { "42".to_owned() => false },
        );
        assert_eq!(classify(Some(&denied_vendor)), ConsentState::NoConsent);
    }

    #[test]
    fn classification_is_idempotent() {
        let payload = payload(hashmap! { "1".to_owned() => false }, hashmap! {});
        assert_eq!(classify(Some(&payload)), classify(Some(&payload)));
    }

    #[test]
    fn states_serialize_by_discriminant() {
        assert_eq!(serde_json::to_value(ConsentState::NoConsent).unwrap(), 0);
        assert_eq!(serde_json::to_value(ConsentState::Consent).unwrap(), 1);
        assert_eq!(serde_json::to_value(ConsentState::SomeConsent).unwrap(), 2);
        assert_eq!(serde_json::to_value(ConsentState::Undefined).unwrap(), 3);
    }
}
