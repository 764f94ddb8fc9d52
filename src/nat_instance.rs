use serde::Serialize;

use crate::security_group::NAT_SECURITY_GROUP;
use crate::template::{Intrinsic, LogicalId, Properties, Resource, ResourceType, Resources, Tag};

pub const DEFAULT_NAME: &str = "NatInstance";
pub const DEFAULT_PUBLIC_SUBNET: &str = "Public";
pub const INTERNET_GATEWAY_ATTACHMENT: &str = "InternetGatewayAttachment";

const POLICY_VERSION: &str = "2012-10-17";

// Same commands as the fck-nat bootstrap, without its leading indentation.
const USER_DATA: &str = "#!/bin/bash -xe
yum update -y
yum install -y https://s3.amazonaws.com/ec2-downloads-windows/SSMAgent/latest/linux_arm64/amazon-ssm-agent.rpm
systemctl enable fck-nat.service
systemctl restart fck-nat.service
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatInstanceOptions {
    /// Base logical ID; the role and profile IDs are derived from it.
    /// Has to be non-empty and ASCII alphanumeric like any CloudFormation
    /// logical ID, otherwise `build_nat_instance` returns an empty fragment.
    pub name: String,
}

impl Default for NatInstanceOptions {
    fn default() -> Self {
        return Self {
            name: String::from(DEFAULT_NAME),
        };
    }
}

/// Naming conventions of the surrounding VPC template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkNaming {
    pub public_subnet: String,
}

impl NetworkNaming {
    /// Logical ID of the `index`-th (1-based) public subnet.
    pub fn public_subnet_id(&self, index: usize) -> String {
        return format!("{}Subnet{}", self.public_subnet, index);
    }
}

impl Default for NetworkNaming {
    fn default() -> Self {
        return Self {
            public_subnet: String::from(DEFAULT_PUBLIC_SUBNET),
        };
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Ebs {
    pub volume_size: u32,
    pub volume_type: String,
    pub delete_on_termination: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct BlockDeviceMapping {
    pub device_name: String,
    pub ebs: Ebs,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    pub associate_public_ip_address: bool,
    pub delete_on_termination: bool,
    pub description: String,
    pub device_index: String,
    pub group_set: Vec<Intrinsic>,
    pub subnet_id: Intrinsic,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProperties {
    pub availability_zone: Intrinsic,
    pub block_device_mappings: Vec<BlockDeviceMapping>,
    pub iam_instance_profile: Intrinsic,
    pub image_id: String,
    pub instance_type: String,
    pub monitoring: bool,
    pub network_interfaces: Vec<NetworkInterface>,
    /// Has to stay disabled, otherwise forwarded traffic is dropped.
    pub source_dest_check: bool,
    pub tags: Vec<Tag>,
    pub user_data: Intrinsic,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub service: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Action {
    Single(String),
    List(Vec<String>),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    pub action: Action,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    fn allow_all_resources(actions: &[&str]) -> Self {
        return Self {
            version: String::from(POLICY_VERSION),
            statement: vec![Statement {
                effect: Effect::Allow,
                principal: None,
                action: Action::List(actions.iter().map(|action| action.to_string()).collect()),
                resource: Some(String::from("*")),
            }],
        };
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    pub policy_name: String,
    pub policy_document: PolicyDocument,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProperties {
    pub assume_role_policy_document: PolicyDocument,
    pub managed_policy_arns: Vec<String>,
    pub policies: Vec<Policy>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProfileProperties {
    pub roles: Vec<Intrinsic>,
}

/// Builds the NAT instance together with its IAM role and instance profile.
///
/// Returns an empty fragment when `image_id` is empty, `zones` is empty or
/// `options.name` is not a valid logical ID. Callers detect invalid input by
/// checking for the empty result.
pub fn build_nat_instance(
    image_id: &str,
    instance_type: &str,
    zones: &[String],
    options: &NatInstanceOptions,
    naming: &NetworkNaming,
) -> Resources {
    if image_id.is_empty() {
        return Resources::new();
    }
    if zones.is_empty() {
        return Resources::new();
    }

    let instance_id = match LogicalId::new(options.name.as_str()) {
        Ok(id) => id,
        Err(_) => return Resources::new(),
    };
    let (role_id, profile_id) = match (
        instance_id.with_suffix("Role"),
        instance_id.with_suffix("InstanceProfile"),
    ) {
        (Ok(role_id), Ok(profile_id)) => (role_id, profile_id),
        _ => return Resources::new(),
    };

    let instance = Resource {
        resource_type: ResourceType::Instance,
        depends_on: Some(String::from(INTERNET_GATEWAY_ATTACHMENT)),
        properties: Properties::Instance(build_instance_properties(
            image_id,
            instance_type,
            zones,
            &profile_id,
            naming,
        )),
    };
    let role = Resource {
        resource_type: ResourceType::Role,
        depends_on: None,
        properties: Properties::Role(build_role_properties()),
    };
    let profile = Resource {
        resource_type: ResourceType::InstanceProfile,
        depends_on: None,
        properties: Properties::InstanceProfile(InstanceProfileProperties {
            roles: vec![Intrinsic::reference(&role_id)],
        }),
    };

    let mut resources = Resources::new();
    resources.insert(instance_id, instance);
    resources.insert(role_id, role);
    resources.insert(profile_id, profile);

    return resources;
}

fn build_instance_properties(
    image_id: &str,
    instance_type: &str,
    zones: &[String],
    profile_id: &LogicalId,
    naming: &NetworkNaming,
) -> InstanceProperties {
    return InstanceProperties {
        // Pinned to the first zone.
        availability_zone: Intrinsic::select(0, zones),
        block_device_mappings: vec![BlockDeviceMapping {
            device_name: String::from("/dev/xvda"),
            ebs: Ebs {
                volume_size: 10,
                volume_type: String::from("gp3"),
                delete_on_termination: true,
            },
        }],
        iam_instance_profile: Intrinsic::reference(profile_id),
        image_id: String::from(image_id),
        instance_type: String::from(instance_type),
        monitoring: false,
        network_interfaces: vec![NetworkInterface {
            associate_public_ip_address: true,
            delete_on_termination: true,
            description: String::from("eth0"),
            device_index: String::from("0"),
            group_set: vec![Intrinsic::reference(NAT_SECURITY_GROUP)],
            subnet_id: Intrinsic::reference(naming.public_subnet_id(1)),
        }],
        source_dest_check: false,
        tags: vec![Tag::name(Intrinsic::sub("${AWS::StackName}-nat"))],
        user_data: Intrinsic::base64(Intrinsic::sub(USER_DATA)),
    };
}

fn build_role_properties() -> RoleProperties {
    return RoleProperties {
        assume_role_policy_document: PolicyDocument {
            version: String::from(POLICY_VERSION),
            statement: vec![Statement {
                effect: Effect::Allow,
                principal: Some(Principal {
                    service: String::from("ec2.amazonaws.com"),
                }),
                action: Action::Single(String::from("sts:AssumeRole")),
                resource: None,
            }],
        },
        managed_policy_arns: vec![
            // Session Manager access
            String::from("arn:aws:iam::aws:policy/AmazonSSMManagedInstanceCore"),
            String::from("arn:aws:iam::aws:policy/CloudWatchAgentServerPolicy"),
        ],
        policies: vec![
            Policy {
                policy_name: String::from("NATSSMPolicy"),
                policy_document: PolicyDocument::allow_all_resources(&["ssm:GetParameter"]),
            },
            // Static IP
            Policy {
                policy_name: String::from("NATEIPolicy"),
                policy_document: PolicyDocument::allow_all_resources(&[
                    "ec2:AssociateAddress",
                    "ec2:DisassociateAddress",
                ]),
            },
            // HA mode
            Policy {
                policy_name: String::from("NATNetworkInterfacePolicy"),
                policy_document: PolicyDocument::allow_all_resources(&[
                    "ec2:AttachNetworkInterface",
                    "ec2:DetachNetworkInterface",
                ]),
            },
        ],
    };
}
