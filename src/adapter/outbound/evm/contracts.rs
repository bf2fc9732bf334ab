//! Contract bindings for token approvals and the settlement contract.

use alloy_sol_types::sol;

// ERC-20 interface (minimal for approval)
sol! {
    #[sol(rpc)]
    contract IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

// Operator approval shared by ERC-721 and ERC-1155
sol! {
    #[sol(rpc)]
    contract ICollection {
        function isApprovedForAll(address owner, address operator) external view returns (bool);
        function setApprovalForAll(address operator, bool approved) external;
    }
}

// Settlement contract entry points and order structures
sol! {
    struct OfferItem {
        uint8 itemType;
        address token;
        uint256 identifierOrCriteria;
        uint256 startAmount;
        uint256 endAmount;
    }

    struct ConsiderationItem {
        uint8 itemType;
        address token;
        uint256 identifierOrCriteria;
        uint256 startAmount;
        uint256 endAmount;
        address recipient;
    }

    struct OrderParameters {
        address offerer;
        address zone;
        OfferItem[] offer;
        ConsiderationItem[] consideration;
        uint8 orderType;
        uint256 startTime;
        uint256 endTime;
        bytes32 zoneHash;
        uint256 salt;
        bytes32 conduitKey;
        uint256 totalOriginalConsiderationItems;
    }

    struct Order {
        OrderParameters parameters;
        bytes signature;
    }

    struct AdvancedOrder {
        OrderParameters parameters;
        uint120 numerator;
        uint120 denominator;
        bytes signature;
        bytes extraData;
    }

    struct CriteriaResolver {
        uint256 orderIndex;
        uint8 side;
        uint256 index;
        uint256 identifier;
        bytes32[] criteriaProof;
    }

    struct AdditionalRecipient {
        uint256 amount;
        address recipient;
    }

    struct BasicOrderParameters {
        address considerationToken;
        uint256 considerationIdentifier;
        uint256 considerationAmount;
        address offerer;
        address zone;
        address offerToken;
        uint256 offerIdentifier;
        uint256 offerAmount;
        uint8 basicOrderType;
        uint256 startTime;
        uint256 endTime;
        bytes32 zoneHash;
        uint256 salt;
        bytes32 offererConduitKey;
        bytes32 fulfillerConduitKey;
        uint256 totalOriginalAdditionalRecipients;
        AdditionalRecipient[] additionalRecipients;
        bytes signature;
    }

    #[sol(rpc)]
    contract ISettlement {
        function getOrderStatus(bytes32 orderHash)
            external
            view
            returns (bool isValidated, bool isCancelled, uint256 totalFilled, uint256 totalSize);

        function fulfillBasicOrder(BasicOrderParameters calldata parameters)
            external
            payable
            returns (bool fulfilled);

        function fulfillOrder(Order calldata order, bytes32 fulfillerConduitKey)
            external
            payable
            returns (bool fulfilled);

        function fulfillAdvancedOrder(
            AdvancedOrder calldata advancedOrder,
            CriteriaResolver[] calldata criteriaResolvers,
            bytes32 fulfillerConduitKey,
            address recipient
        ) external payable returns (bool fulfilled);
    }
}
