#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod transaction;

pub(crate) use db::{
    must_create_employee, must_create_service, must_create_transaction, open_test_db,
};
pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value, assert_form_select,
    assert_form_submit_button, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{
    assert_valid_html, count_table_rows, parse_html_document, parse_html_fragment, select_text,
};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok, get_header};
pub(crate) use transaction::{assert_close, sale};
