// Mesh endpoints

use tracing::debug;

use crate::client::SrmClient;
use crate::error::Error;
use crate::models::{MeshNode, MeshNodeList};

impl SrmClient {
    /// List mesh nodes, the router itself included.
    ///
    /// `SYNO.Mesh.Node.List` / `get`
    pub async fn mesh_nodes(&self) -> Result<Vec<MeshNode>, Error> {
        debug!("fetching mesh nodes");
        let list: MeshNodeList = self.call("SYNO.Mesh.Node.List", "get", 4, &[]).await?;
        Ok(list.nodes)
    }
}
