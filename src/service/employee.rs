use uuid::Uuid;

use crate::auth::SubjectRole;
use crate::domain::{
    collapse_spaces, hyphenate_spaces, EditableEmployee, EditableEmployeeWithPassword, Employee, EmployeeFilter,
    EmployeePatch, EmployeeRole, Error, Geometry, Name, Page, Password, Username,
};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create employee";
const DESC_LIST: &str = "service: failed to list employees";
const DESC_GET: &str = "service: failed to get employee";
const DESC_PATCH: &str = "service: failed to patch employee";
const DESC_UPDATE_PASSWORD: &str = "service: failed to update employee password";
const DESC_DELETE: &str = "service: failed to delete employee";
const DESC_SIGN_IN: &str = "service: failed to sign in employee";

fn subject_roles(role: EmployeeRole) -> [SubjectRole; 1] {
    match role {
        EmployeeRole::WasteOperator => [SubjectRole::WasteOperator],
        EmployeeRole::Manager => [SubjectRole::Manager],
    }
}

fn point_of(geometry: &Geometry) -> Result<[f64; 2], Error> {
    geometry.as_point().ok_or(Error::FieldInvalid("geometry"))
}

fn normalize(employee: EditableEmployee) -> EditableEmployee {
    EditableEmployee {
        username: Username(hyphenate_spaces(employee.username.as_str())),
        first_name: Name(collapse_spaces(employee.first_name.as_str())),
        last_name: Name(collapse_spaces(employee.last_name.as_str())),
        ..employee
    }
}

fn validate(employee: &EditableEmployee) -> Result<[f64; 2], Error> {
    if !employee.username.valid() {
        return Err(Error::FieldInvalid("username"));
    }
    if !employee.first_name.valid() {
        return Err(Error::FieldInvalid("firstName"));
    }
    if !employee.last_name.valid() {
        return Err(Error::FieldInvalid("lastName"));
    }
    point_of(&employee.geometry)
}

impl Service {
    pub async fn create_employee(&self, input: EditableEmployeeWithPassword) -> Result<Employee, Error> {
        let employee = normalize(input.employee);
        let point = match validate(&employee) {
            Ok(point) => point,
            Err(err) => return Err(self.fail(err, DESC_CREATE)),
        };
        if !self.authn().valid_password(input.password.as_str()) {
            return Err(self.fail(Error::FieldInvalid("password"), DESC_CREATE));
        }

        let password_hash = self
            .authn()
            .hash_password(input.password.as_str())
            .map_err(|e| self.fail(Error::Unexpected(e.into()), DESC_CREATE))?;

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
        let result = self.create_employee_in(&mut tx, &employee, &password_hash, point).await;
        self.finish(tx, result, DESC_CREATE).await
    }

    async fn create_employee_in(
        &self,
        tx: &mut Tx,
        employee: &EditableEmployee,
        password_hash: &str,
        point: [f64; 2],
    ) -> Result<Employee, Error> {
        let (road_id, municipality_id) = self.locate(tx, point).await?;
        let id = self
            .store()
            .create_employee(tx, employee, password_hash, road_id, municipality_id)
            .await?;
        self.store().get_employee(tx, id).await
    }

    pub async fn list_employees(&self, filter: EmployeeFilter) -> Result<Page<Employee>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.store().list_employees(&mut tx, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    pub async fn get_employee(&self, id: Uuid) -> Result<Employee, Error> {
        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_GET))?;
        let result = self.store().get_employee(&mut tx, id).await;
        self.finish(tx, result, DESC_GET).await
    }

    pub async fn patch_employee(&self, id: Uuid, patch: EmployeePatch) -> Result<Employee, Error> {
        let patch = EmployeePatch {
            username: patch.username.map(|u| Username(hyphenate_spaces(u.as_str()))),
            first_name: patch.first_name.map(|n| Name(collapse_spaces(n.as_str()))),
            last_name: patch.last_name.map(|n| Name(collapse_spaces(n.as_str()))),
            geometry: patch.geometry,
        };
        let invalid = [
            patch.username.as_ref().is_some_and(|u| !u.valid()).then_some("username"),
            patch.first_name.as_ref().is_some_and(|n| !n.valid()).then_some("firstName"),
            patch.last_name.as_ref().is_some_and(|n| !n.valid()).then_some("lastName"),
        ];
        if let Some(field) = invalid.into_iter().flatten().next() {
            return Err(self.fail(Error::FieldInvalid(field), DESC_PATCH));
        }
        let point = match &patch.geometry {
            Some(geometry) => match point_of(geometry) {
                Ok(point) => Some(point),
                Err(err) => return Err(self.fail(err, DESC_PATCH)),
            },
            None => None,
        };

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_PATCH))?;
        let result = self.patch_employee_in(&mut tx, id, &patch, point).await;
        self.finish(tx, result, DESC_PATCH).await
    }

    async fn patch_employee_in(
        &self,
        tx: &mut Tx,
        id: Uuid,
        patch: &EmployeePatch,
        point: Option<[f64; 2]>,
    ) -> Result<Employee, Error> {
        let (road_id, municipality_id) = match point {
            Some(point) => self.locate(tx, point).await?,
            None => (None, None),
        };
        self.store().patch_employee(tx, id, patch, road_id, municipality_id).await?;
        self.store().get_employee(tx, id).await
    }

    /// Changes the password after verifying the current one.
    pub async fn update_employee_password(
        &self,
        username: Username,
        old_password: Password,
        password: Password,
    ) -> Result<(), Error> {
        if !self.authn().valid_password(password.as_str()) {
            return Err(self.fail(Error::FieldInvalid("password"), DESC_UPDATE_PASSWORD));
        }

        let password_hash = self
            .authn()
            .hash_password(password.as_str())
            .map_err(|e| self.fail(Error::Unexpected(e.into()), DESC_UPDATE_PASSWORD))?;

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_UPDATE_PASSWORD))?;
        let result = self
            .update_employee_password_in(&mut tx, &username, &old_password, &password_hash)
            .await;
        self.finish(tx, result, DESC_UPDATE_PASSWORD).await
    }

    async fn update_employee_password_in(
        &self,
        tx: &mut Tx,
        username: &Username,
        old_password: &Password,
        password_hash: &str,
    ) -> Result<(), Error> {
        let credentials = self.store().get_employee_sign_in(tx, username).await?;
        let matches = self
            .authn()
            .check_password_hash(old_password.as_str(), &credentials.password_hash)
            .map_err(|e| Error::Unexpected(e.into()))?;
        if !matches {
            return Err(Error::CredentialsIncorrect);
        }

        self.store().update_employee_password(tx, username, password_hash).await
    }

    /// Sets a new password without verifying the current one. Reserved for
    /// administrative resets.
    pub async fn reset_employee_password(&self, username: Username, password: Password) -> Result<(), Error> {
        if !self.authn().valid_password(password.as_str()) {
            return Err(self.fail(Error::FieldInvalid("password"), DESC_UPDATE_PASSWORD));
        }

        let password_hash = self
            .authn()
            .hash_password(password.as_str())
            .map_err(|e| self.fail(Error::Unexpected(e.into()), DESC_UPDATE_PASSWORD))?;

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_UPDATE_PASSWORD))?;
        let result = self
            .store()
            .update_employee_password(&mut tx, &username, &password_hash)
            .await;
        self.finish(tx, result, DESC_UPDATE_PASSWORD).await
    }

    pub async fn delete_employee(&self, id: Uuid) -> Result<Employee, Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.delete_employee_in(&mut tx, id).await;
        self.finish(tx, result, DESC_DELETE).await
    }

    async fn delete_employee_in(&self, tx: &mut Tx, id: Uuid) -> Result<Employee, Error> {
        let employee = self.store().get_employee(tx, id).await?;
        self.store().delete_employee(tx, id).await?;
        Ok(employee)
    }

    /// Verifies the credentials and issues a token carrying the role derived
    /// from the employee record. An unknown username and a wrong password are
    /// indistinguishable to the caller.
    pub async fn sign_in_employee(&self, username: Username, password: Password) -> Result<String, Error> {
        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_SIGN_IN))?;
        let result = self.sign_in_employee_in(&mut tx, &username, &password).await;
        self.finish(tx, result, DESC_SIGN_IN).await
    }

    async fn sign_in_employee_in(
        &self,
        tx: &mut Tx,
        username: &Username,
        password: &Password,
    ) -> Result<String, Error> {
        let credentials = match self.store().get_employee_sign_in(tx, username).await {
            Ok(credentials) => credentials,
            Err(Error::EmployeeNotFound) => return Err(Error::CredentialsIncorrect),
            Err(err) => return Err(err),
        };

        let matches = self
            .authn()
            .check_password_hash(password.as_str(), &credentials.password_hash)
            .map_err(|e| Error::Unexpected(e.into()))?;
        if !matches {
            return Err(Error::CredentialsIncorrect);
        }

        let employee = self.store().get_employee_by_username(tx, username).await?;
        self.authn()
            .new_token(employee.id, &subject_roles(employee.role))
            .map_err(|e| Error::Unexpected(e.into()))
    }
}
