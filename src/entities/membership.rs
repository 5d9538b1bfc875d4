use url::Url;

use super::fields;
use crate::schema::EntityKind;

entity_wrapper!(
    /// A MemberPress membership: the product a member subscribes to.
    Membership,
    EntityKind::Membership
);

impl Membership {
    field_accessors!(ids: id, author, group, thank_you_page_id);
    field_accessors!(
        strings: title,
        content,
        excerpt,
        status,
        period_type,
        signup_button_text,
        limit_cycles_action,
        limit_cycles_expires_type,
        plan_code,
        pricing_title,
        pricing_display,
        custom_price,
        pricing_heading_txt,
        pricing_footer_txt,
        pricing_button_txt,
        pricing_button_position,
        register_price_action,
        register_price,
        thank_you_page_type,
        thank_you_message,
        expire_type,
        expire_unit,
        tax_class,
        custom_template,
        cannot_purchase_message
    );
    field_accessors!(
        counts: period,
        limit_cycles_num,
        limit_cycles_expires_after,
        trial_days,
        group_order,
        expire_after
    );
    field_accessors!(amounts: price, trial_amount);
    field_accessors!(
        flags: limit_cycles,
        trial,
        trial_once,
        is_highlighted,
        pricing_show_price,
        thank_you_page_enabled,
        custom_login_urls_enabled,
        tax_exempt,
        allow_renewal,
        disable_address_fields,
        simultaneous_subscriptions,
        use_custom_template,
        customize_payment_methods,
        customize_profile_fields
    );
    field_accessors!(datetimes: date, date_gmt, modified, modified_gmt, expire_fixed);
    field_accessors!(
        raw: pricing_benefits,
        custom_login_urls_default,
        custom_login_urls,
        custom_payment_methods,
        custom_profile_fields
    );

    /// Page members are sent to after purchase
    pub fn access_url(&self) -> Option<Url> {
        fields::url(&self.fields, "access_url")
    }

    /// True for a free-trial membership with a positive trial length
    pub fn has_trial(&self) -> bool {
        self.trial() && self.trial_days() > 0
    }
}
