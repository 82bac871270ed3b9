//! Loyalty coupons: one free wash for every ten visits.

mod core;
mod coupon_endpoints;

pub use core::{
    Coupon, CouponId, VISITS_PER_COUPON, available_coupons, create_coupon_table, get_coupon,
    get_coupons_for_customer, issue_coupon, redeem_coupon, visits_until_next_coupon,
};
pub use coupon_endpoints::{issue_coupon_endpoint, redeem_coupon_endpoint};
