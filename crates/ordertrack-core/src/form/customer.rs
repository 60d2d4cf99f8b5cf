use crate::form::FormSchema;
use crate::models::CustomerType;

pub const CUSTOMER_TYPE_FIELD: &str = "customer_type";

pub const ORGANIZATION_SECTION: &str = "organization-fields";
pub const PERSONAL_SECTION: &str = "personal-fields";

/// Fields of the multi-step customer registration form.
pub const REGISTRATION_FIELDS: &[&str] = &[
    "csrfmiddlewaretoken",
    "step",
    "full_name",
    "phone",
    "email",
    "address",
    "notes",
    "intent",
    "service_type",
    CUSTOMER_TYPE_FIELD,
    "organization_name",
    "tax_number",
    "personal_subtype",
];

/// Customer form: visibility only, no requirement toggling.
#[derive(Debug)]
pub struct CustomerSchema;

impl FormSchema for CustomerSchema {
    type Kind = CustomerType;

    const SELECTOR: &'static str = CUSTOMER_TYPE_FIELD;

    const SECTIONS: &'static [&'static str] = &[ORGANIZATION_SECTION, PERSONAL_SECTION];

    fn parse(value: &str) -> Option<CustomerType> {
        CustomerType::parse(value)
    }

    fn visible_sections(kind: CustomerType) -> &'static [&'static str] {
        if kind.is_organization() {
            &[ORGANIZATION_SECTION]
        } else {
            &[PERSONAL_SECTION]
        }
    }
}
