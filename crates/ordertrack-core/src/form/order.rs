use crate::error::ValidationError;
use crate::form::FormSchema;
use crate::models::OrderType;
use crate::ports::FormPort;

pub const TYPE_FIELD: &str = "type";

pub const SERVICE_SECTION: &str = "service";
pub const SALES_SECTION: &str = "sales";
pub const CONSULTATION_SECTION: &str = "consultation";
pub const VEHICLE_SECTION: &str = "vehicle";

pub const SERVICE_SELECTION_GROUP: &str = "service_selection";
pub const QUANTITY_FIELD: &str = "quantity";

/// Value-bearing controls of the order form, in document order.
pub const ORDER_FIELDS: &[&str] = &[
    TYPE_FIELD,
    "vehicle",
    "priority",
    "description",
    "estimated_duration",
    "item_name",
    "brand",
    QUANTITY_FIELD,
    "tire_type",
    "inquiry_type",
    "questions",
    "contact_preference",
    "follow_up_date",
];

const SERVICE_REQUIRED: &[&str] = &["description", "estimated_duration"];
const SALES_REQUIRED: &[&str] = &["item_name", "brand", QUANTITY_FIELD, "tire_type"];
const CONSULTATION_REQUIRED: &[&str] = &["inquiry_type", "questions", "contact_preference"];

/// Order form: `service`, `sales` and `consultation` sections are mutually
/// exclusive; the vehicle section belongs to service orders only.
#[derive(Debug)]
pub struct OrderSchema;

impl FormSchema for OrderSchema {
    type Kind = OrderType;

    const SELECTOR: &'static str = TYPE_FIELD;

    const SECTIONS: &'static [&'static str] = &[
        SERVICE_SECTION,
        SALES_SECTION,
        CONSULTATION_SECTION,
        VEHICLE_SECTION,
    ];

    const TOGGLED_FIELDS: &'static [&'static str] = &[
        "description",
        "estimated_duration",
        "item_name",
        "brand",
        QUANTITY_FIELD,
        "tire_type",
        "inquiry_type",
        "questions",
        "contact_preference",
    ];

    fn parse(value: &str) -> Option<OrderType> {
        OrderType::parse(value)
    }

    fn visible_sections(kind: OrderType) -> &'static [&'static str] {
        match kind {
            OrderType::Service => &[SERVICE_SECTION, VEHICLE_SECTION],
            OrderType::Sales => &[SALES_SECTION],
            OrderType::Consultation => &[CONSULTATION_SECTION],
        }
    }

    fn required_fields(kind: OrderType) -> &'static [&'static str] {
        match kind {
            OrderType::Service => SERVICE_REQUIRED,
            OrderType::Sales => SALES_REQUIRED,
            OrderType::Consultation => CONSULTATION_REQUIRED,
        }
    }

    fn numeric_floors(kind: OrderType) -> &'static [(&'static str, i64)] {
        match kind {
            OrderType::Sales => &[(QUANTITY_FIELD, 1)],
            _ => &[],
        }
    }

    fn check_submit<F: FormPort + ?Sized>(
        kind: OrderType,
        form: &F,
    ) -> Result<(), ValidationError> {
        match kind {
            OrderType::Service => {
                if form.checked_count(SERVICE_SELECTION_GROUP) == 0 {
                    return Err(ValidationError::new(
                        "Select at least one service in Service Selection",
                    ));
                }
            }
            OrderType::Sales => {
                if let Some(quantity) = form.value(QUANTITY_FIELD)
                    && !is_positive_whole(&quantity)
                {
                    return Err(ValidationError::on_field(
                        QUANTITY_FIELD,
                        "Quantity must be at least 1",
                    ));
                }
            }
            OrderType::Consultation => {}
        }
        Ok(())
    }
}

/// `true` for whole numbers ≥ 1. Blank counts as zero.
fn is_positive_whole(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return false;
    }
    raw.parse::<f64>()
        .is_ok_and(|n| n.is_finite() && n.fract() == 0.0 && n >= 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::DynamicForm;
    use crate::popup::PopupKind;
    use crate::ports::{FormFields, MemoryForm, PopupLog};

    fn order_form(kind: &str) -> MemoryForm {
        let mut form = MemoryForm::order_form();
        form.set_value(TYPE_FIELD, kind);
        form
    }

    #[test]
    fn test_service_shows_service_and_vehicle() {
        let mut form = order_form("service");
        let ctl = DynamicForm::<OrderSchema>::attach(&mut form);

        assert_eq!(ctl.current(), Some(OrderType::Service));
        assert_eq!(form.visible_sections(), vec![SERVICE_SECTION, VEHICLE_SECTION]);
        assert_eq!(form.required_fields(), vec!["description", "estimated_duration"]);
        assert!(ctl.requirements().is_required("description"));
        assert!(!ctl.requirements().is_required("brand"));
    }

    #[test]
    fn test_sales_installs_quantity_floor() {
        let mut form = order_form("sales");
        DynamicForm::<OrderSchema>::attach(&mut form);

        assert_eq!(form.visible_sections(), vec![SALES_SECTION]);
        assert_eq!(form.section_visible(VEHICLE_SECTION), Some(false));
        assert_eq!(form.min(QUANTITY_FIELD).as_deref(), Some("1"));
        assert_eq!(
            form.required_fields(),
            vec!["item_name", "brand", "quantity", "tire_type"]
        );
    }

    #[test]
    fn test_stronger_floor_is_kept() {
        let mut form = order_form("sales");
        form.set_min(QUANTITY_FIELD, "5");
        DynamicForm::<OrderSchema>::attach(&mut form);
        assert_eq!(form.min(QUANTITY_FIELD).as_deref(), Some("5"));

        form.set_min(QUANTITY_FIELD, "0");
        DynamicForm::<OrderSchema>::attach(&mut form);
        assert_eq!(form.min(QUANTITY_FIELD).as_deref(), Some("1"));
    }

    #[test]
    fn test_unknown_discriminant_is_safe_default() {
        for value in ["", "repair", "SALES"] {
            let mut form = order_form(value);
            let ctl = DynamicForm::<OrderSchema>::attach(&mut form);
            assert_eq!(ctl.current(), None);
            assert!(form.visible_sections().is_empty(), "{value}");
            assert!(form.required_fields().is_empty(), "{value}");
            assert_eq!(ctl.requirements().required().count(), 0);
            assert!(form.min(QUANTITY_FIELD).is_none());
        }
    }

    #[test]
    fn test_switching_back_restores_exact_requirements() {
        for a in OrderType::ALL {
            for b in OrderType::ALL {
                let mut form = order_form(a.as_str());
                let mut ctl = DynamicForm::<OrderSchema>::attach(&mut form);
                let first = form.required_fields().join(",");
                let first_req = ctl.requirements().clone();

                form.set_value(TYPE_FIELD, b.as_str());
                ctl.apply(&mut form);
                form.set_value(TYPE_FIELD, a.as_str());
                ctl.apply(&mut form);

                assert_eq!(form.required_fields().join(","), first, "{a} -> {b} -> {a}");
                assert_eq!(ctl.requirements(), &first_req);
            }
        }
    }

    #[test]
    fn test_sales_zero_quantity_blocks_submit() {
        let mut form = order_form("sales");
        form.set_value(QUANTITY_FIELD, "0");
        let ctl = DynamicForm::<OrderSchema>::attach(&mut form);
        let popups = PopupLog::new();

        let err = ctl.submit(&mut form, &popups).unwrap_err();
        assert!(err.message.contains("at least 1"));
        assert_eq!(form.focused(), Some(QUANTITY_FIELD));
        let popup = popups.last().unwrap();
        assert_eq!(popup.kind, PopupKind::Error);
        assert!(popup.text.contains("at least 1"));
    }

    #[test]
    fn test_sales_quantity_values() {
        let cases = [
            ("1", true),
            ("12", true),
            ("2.0", true),
            ("", false),
            ("1.5", false),
            ("-3", false),
            ("abc", false),
        ];
        for (raw, ok) in cases {
            let mut form = order_form("sales");
            form.set_value(QUANTITY_FIELD, raw);
            let ctl = DynamicForm::<OrderSchema>::attach(&mut form);
            assert_eq!(ctl.submit(&mut form, &PopupLog::new()).is_ok(), ok, "{raw:?}");
        }
    }

    #[test]
    fn test_service_requires_a_checked_service() {
        let mut form = order_form("service");
        let ctl = DynamicForm::<OrderSchema>::attach(&mut form);
        let popups = PopupLog::new();

        let err = ctl.submit(&mut form, &popups).unwrap_err();
        assert!(err.message.contains("Service Selection"));
        assert!(err.field.is_none());
        assert!(form.focused().is_none());

        form.set_checked(SERVICE_SELECTION_GROUP, "oil_change", true);
        assert!(ctl.submit(&mut form, &popups).is_ok());
        assert_eq!(popups.popups().len(), 1);
    }

    #[test]
    fn test_consultation_and_unknown_submit_freely() {
        for value in ["consultation", "", "other"] {
            let mut form = order_form(value);
            let ctl = DynamicForm::<OrderSchema>::attach(&mut form);
            let popups = PopupLog::new();
            assert!(ctl.submit(&mut form, &popups).is_ok());
            assert!(popups.popups().is_empty());
        }
    }
}
