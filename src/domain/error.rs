use thiserror::Error;

/// Domain error taxonomy shared by the store and service layers.
///
/// Variants up to `Unexpected` are expected business outcomes: they are logged
/// at info severity and translate to 4xx responses. `Unexpected` carries any
/// infrastructure failure and translates to a generic 5xx.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid field value: {0}")]
    FieldInvalid(&'static str),
    #[error("invalid filter value: {0}")]
    FilterInvalid(&'static str),

    #[error("incorrect credentials")]
    CredentialsIncorrect,

    #[error("user not found")]
    UserNotFound,
    #[error("username already exists")]
    UserAlreadyExists,

    #[error("employee not found")]
    EmployeeNotFound,
    #[error("employee username already exists")]
    EmployeeAlreadyExists,

    #[error("container not found")]
    ContainerNotFound,
    #[error("container associated with route")]
    ContainerAssociatedWithRoute,

    #[error("truck not found")]
    TruckNotFound,
    #[error("truck associated with warehouse")]
    TruckAssociatedWithWarehouse,
    #[error("truck associated with route")]
    TruckAssociatedWithRoute,

    #[error("warehouse not found")]
    WarehouseNotFound,
    #[error("warehouse truck capacity below current association count")]
    WarehouseTruckCapacityMinLimit,
    #[error("warehouse truck capacity reached")]
    WarehouseTruckCapacityMaxLimit,
    #[error("warehouse associated with truck")]
    WarehouseAssociatedWithTruck,
    #[error("warehouse associated with route as departure")]
    WarehouseAssociatedWithRouteDeparture,
    #[error("warehouse associated with route as arrival")]
    WarehouseAssociatedWithRouteArrival,

    #[error("warehouse truck association not found")]
    WarehouseTruckNotFound,
    #[error("warehouse truck association already exists")]
    WarehouseTruckAlreadyExists,
    #[error("warehouse truck associated with route as departure")]
    WarehouseTruckAssociatedWithRouteDeparture,
    #[error("warehouse truck associated with route as arrival")]
    WarehouseTruckAssociatedWithRouteArrival,

    #[error("landfill not found")]
    LandfillNotFound,

    #[error("route not found")]
    RouteNotFound,
    #[error("route departure warehouse not found")]
    RouteDepartureWarehouseNotFound,
    #[error("route arrival warehouse not found")]
    RouteArrivalWarehouseNotFound,
    #[error("route truck person capacity below current employee count")]
    RouteTruckPersonCapacityMinLimit,
    #[error("route truck person capacity reached")]
    RouteTruckPersonCapacityMaxLimit,

    #[error("route employee association not found")]
    RouteEmployeeNotFound,
    #[error("route employee association already exists")]
    RouteEmployeeAlreadyExists,

    #[error("route container association not found")]
    RouteContainerNotFound,
    #[error("route container association already exists")]
    RouteContainerAlreadyExists,

    #[error("road not found")]
    RoadNotFound,
    #[error("municipality not found")]
    MunicipalityNotFound,

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Error {
    /// Whether this error is an expected business outcome (validation,
    /// invariant, not-found, conflict) rather than an infrastructure failure.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Error::Unexpected(_))
    }

    /// Whether the underlying cause is a Postgres serialization failure
    /// (SQLSTATE 40001), which a caller may retry.
    pub fn is_serialization_failure(&self) -> bool {
        let Error::Unexpected(err) = self else {
            return false;
        };

        err.chain().any(|cause| {
            cause
                .downcast_ref::<sqlx::Error>()
                .and_then(|e| e.as_database_error())
                .and_then(|db| db.code())
                .map(|code| code == "40001")
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_errors_exclude_unexpected() {
        assert!(Error::RouteTruckPersonCapacityMaxLimit.is_expected());
        assert!(Error::UserNotFound.is_expected());
        assert!(!Error::Unexpected(anyhow::anyhow!("boom")).is_expected());
    }

    #[test]
    fn serialization_failure_only_matches_sqlstate_40001() {
        assert!(!Error::RouteNotFound.is_serialization_failure());
        assert!(!Error::Unexpected(anyhow::anyhow!("boom")).is_serialization_failure());
    }
}
