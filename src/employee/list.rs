//! Employees listing page.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbState,
    employee::{Employee, EmployeeId, Role, get_all_employees, require_role},
    endpoints,
    html::{
        BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, TABLE_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
};

/// Render the list of employees. Only admins may see it.
pub async fn get_employees_page(
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    require_role(employee_id, Role::can_manage_employees, &connection)?;

    let employees = get_all_employees(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve employees: {error}"))?;

    Ok(employees_view(&employees, employee_id).into_response())
}

fn employees_view(employees: &[Employee], current_employee: EmployeeId) -> Markup {
    let nav_bar = NavBar::new(endpoints::EMPLOYEES_VIEW).into_html();

    let table_row = |employee: &Employee| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_EMPLOYEE_VIEW, employee.id.as_i64());
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_EMPLOYEE, employee.id.as_i64());
        let confirm_message = format!("Are you sure you want to delete {}?", employee.name);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (employee.name) }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(BADGE_STYLE) { (employee.role) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        @if employee.id == current_employee {
                            a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                        } @else {
                            (edit_delete_action_links(
                                &edit_url,
                                &delete_url,
                                &confirm_message,
                                "closest tr",
                                "delete",
                            ))
                        }
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Employees" }

                    a href=(endpoints::NEW_EMPLOYEE_VIEW) class=(LINK_STYLE)
                    {
                        "Add Employee"
                    }
                }

                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Role" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for employee in employees {
                            (table_row(employee))
                        }
                    }
                }
            }
        }
    );

    base("Employees", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};

    use crate::{
        Error,
        app_state::DbState,
        employee::{Role, get_employees_page},
        test_utils::{
            assert_status_ok, assert_valid_html, count_table_rows, must_create_employee,
            open_test_db, parse_html_document, select_text,
        },
    };

    #[tokio::test]
    async fn admin_sees_every_employee() {
        let connection = open_test_db();
        let admin = must_create_employee("Boss", Role::Admin, &connection);
        must_create_employee("Aroha", Role::Washer, &connection);
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_employees_page(State(state), Extension(admin.id))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(count_table_rows(&html), 2);
        assert_eq!(select_text(&html, "tbody td:first-child"), vec!["Aroha", "Boss"]);
    }

    #[tokio::test]
    async fn admin_cannot_delete_themself_from_list() {
        let connection = open_test_db();
        let admin = must_create_employee("Boss", Role::Admin, &connection);
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_employees_page(State(state), Extension(admin.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert!(select_text(&html, "button[hx-delete]").is_empty());
    }

    #[tokio::test]
    async fn washer_is_forbidden() {
        let connection = open_test_db();
        let washer = must_create_employee("Aroha", Role::Washer, &connection);
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result = get_employees_page(State(state), Extension(washer.id)).await;

        assert!(matches!(result, Err(Error::Forbidden)));
    }
}
