//! Service catalog listing page.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbState,
    employee::{EmployeeId, get_employee},
    endpoints,
    html::{
        BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, TABLE_STYLE, base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    service::{Service, get_all_services},
};

/// Render the service catalog.
///
/// Everyone can see the catalog, but only admins and managers get the links
/// for changing it.
pub async fn get_services_page(
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let can_manage = get_employee(employee_id, &connection)?
        .role
        .can_manage_catalog();

    let services = get_all_services(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve services: {error}"))?;

    Ok(services_view(&services, can_manage).into_response())
}

fn services_view(services: &[Service], can_manage: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::SERVICES_VIEW).into_html();

    let table_row = |service: &Service| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_SERVICE_VIEW, service.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_SERVICE, service.id);
        let confirm_message = format!("Are you sure you want to delete '{}'?", service.name);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (service.name)

                    @if !service.active {
                        " "
                        span class=(BADGE_STYLE) { "Inactive" }
                    }
                }
                td class=(TABLE_CELL_STYLE) { (format_currency(service.price)) }
                td class=(TABLE_CELL_STYLE) { (format_currency(service.commission)) }

                @if can_manage {
                    td class=(TABLE_CELL_STYLE)
                    {
                        div class="flex gap-4"
                        {
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
                    h1 class="text-xl font-bold" { "Services" }

                    @if can_manage {
                        a href=(endpoints::NEW_SERVICE_VIEW) class=(LINK_STYLE) { "Add Service" }
                    }
                }

                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Commission" }

                            @if can_manage {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }
                    }

                    tbody
                    {
                        @for service in services {
                            (table_row(service))
                        }
                    }
                }

                @if services.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400" { "No services yet." }
                }
            }
        }
    );

    base("Services", &[], &content)
}
