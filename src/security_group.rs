use serde::Serialize;

use crate::template::{Intrinsic, LogicalId, Properties, Resource, ResourceType, Resources, Tag};

pub const NAT_SECURITY_GROUP: &str = "NatSecurityGroup";

const ANYWHERE: &str = "0.0.0.0/0";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupRule {
    pub description: String,
    pub ip_protocol: String,
    pub from_port: u16,
    pub to_port: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_security_group_id: Option<Intrinsic>,
}

impl SecurityGroupRule {
    fn tcp_from_anywhere(port: u16, description: &str) -> Self {
        return Self {
            description: String::from(description),
            ip_protocol: String::from("tcp"),
            from_port: port,
            to_port: port,
            cidr_ip: Some(String::from(ANYWHERE)),
            source_security_group_id: None,
        };
    }

    fn tcp_from_group(port: u16, description: &str, group: &str) -> Self {
        return Self {
            description: String::from(description),
            ip_protocol: String::from("tcp"),
            from_port: port,
            to_port: port,
            cidr_ip: None,
            source_security_group_id: Some(Intrinsic::reference(group)),
        };
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupProperties {
    pub group_description: String,
    pub vpc_id: Intrinsic,
    pub security_group_egress: Vec<SecurityGroupRule>,
    pub security_group_ingress: Vec<SecurityGroupRule>,
    pub tags: Vec<Tag>,
}

/// Builds the security group attached to the NAT instance.
///
/// `VPC` and `AppSecurityGroup` are referenced, not defined, here.
pub fn build_nat_security_group() -> Resources {
    let properties = SecurityGroupProperties {
        group_description: String::from("NAT Instance"),
        vpc_id: Intrinsic::reference("VPC"),
        security_group_egress: vec![
            SecurityGroupRule::tcp_from_anywhere(80, "permit outbound HTTP to the Internet"),
            SecurityGroupRule::tcp_from_anywhere(443, "permit outbound HTTPS to the Internet"),
            SecurityGroupRule::tcp_from_anywhere(3306, "permit outbound DB access to the Internet"),
        ],
        security_group_ingress: vec![
            SecurityGroupRule::tcp_from_group(
                80,
                "permit inbound HTTP from AppSecurityGroup",
                "AppSecurityGroup",
            ),
            SecurityGroupRule::tcp_from_group(
                443,
                "permit inbound HTTPS from AppSecurityGroup",
                "AppSecurityGroup",
            ),
            SecurityGroupRule::tcp_from_anywhere(3306, "permit inbound DB access from the Internet"),
        ],
        tags: vec![Tag::name(Intrinsic::sub("${AWS::StackName}-nat"))],
    };

    let mut resources = Resources::new();
    resources.insert(
        LogicalId::from_static(NAT_SECURITY_GROUP),
        Resource {
            resource_type: ResourceType::SecurityGroup,
            depends_on: None,
            properties: Properties::SecurityGroup(properties),
        },
    );

    return resources;
}
