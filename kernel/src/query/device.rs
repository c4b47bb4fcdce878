use crate::entity::{Device, DeviceId, OperatingSystem};
use crate::KernelError;

#[async_trait::async_trait]
pub trait DeviceQuery<Connection: 'static + Send>: Sync + Send + 'static {
    async fn find_all(
        &self,
        con: &mut Connection,
    ) -> error_stack::Result<Vec<Device>, KernelError>;

    async fn find_by_os(
        &self,
        con: &mut Connection,
        os: &OperatingSystem,
    ) -> error_stack::Result<Vec<Device>, KernelError>;

    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &DeviceId,
    ) -> error_stack::Result<Option<Device>, KernelError>;
}

pub trait DependOnDeviceQuery<Connection: 'static + Send>: Sync + Send + 'static {
    type DeviceQuery: DeviceQuery<Connection>;
    fn device_query(&self) -> &Self::DeviceQuery;
}
