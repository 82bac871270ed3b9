//! Monthly membership plans.

mod core;
mod membership_endpoints;
mod memberships_page;

pub use core::{
    Membership, MembershipBuilder, MembershipId, cancel_membership, create_membership,
    create_membership_table, get_all_memberships, get_membership, get_memberships_for_customer,
};
pub use membership_endpoints::{cancel_membership_endpoint, create_membership_endpoint};
pub use memberships_page::get_memberships_page;
