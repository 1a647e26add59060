use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const REGION_YAML: &str = r#"
name: staging
region: ap-northeast-1
internet_gateways:
  - name: main-igw
elastic_ips:
  - name: nat-eip
vpcs:
  - name: main-vpc
    cidr_block: 10.0.0.0/16
    internet_gateway: main-igw
    route_tables:
      - name: main-rt
        default: true
      - name: public-rt
        routes:
          - destination: all-traffic
            target: main-igw
    subnets:
      - name: public-a
        cidr_block: 10.0.1.0/24
        availability_zone: ap-northeast-1a
        route_table: public-rt
    network_acls:
      - name: default-acl
        default: true
        inbound_rules:
          - rule_number: 100
            traffic_type: HTTPS
            peer: all-traffic
        outbound_rules:
          - rule_number: 100
            protocol: ALL
            port_range: ALL
            peer: all-traffic
    security_groups:
      - name: web-sg
        description: public web servers
        inbound_rules:
          - protocol: TCP
            port_range: "443"
            peer: all-traffic
    nat_gateways:
      - name: nat-gw
        subnet: public-a
        elastic_ip: nat-eip
"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn write_region(&self, content: &str) -> PathBuf {
        self.write("region.yaml", content)
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }
}

/// [`REGION_YAML`] as the CLI would record it after a successful `up`
pub fn created_region_yaml() -> String {
    REGION_YAML
        .replace(
            "  - name: main-igw\n",
            "  - name: main-igw\n    id: igw-0a1b2c\n",
        )
        .replace(
            "    cidr_block: 10.0.0.0/16\n",
            "    cidr_block: 10.0.0.0/16\n    id: vpc-0d4e5f\n",
        )
}
